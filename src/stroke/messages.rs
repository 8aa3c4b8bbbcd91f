use crate::stroke::session::Outcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineToMain {
    Finished { outcome: Outcome },
}
