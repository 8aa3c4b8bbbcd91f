#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawLifecycle {
    Idle,
    Preparing,
    Drawing,
    Finishing,
}

impl DrawLifecycle {
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

pub fn can_transition(from: DrawLifecycle, to: DrawLifecycle) -> bool {
    matches!(
        (from, to),
        (DrawLifecycle::Idle, DrawLifecycle::Preparing)
            | (DrawLifecycle::Preparing, DrawLifecycle::Drawing)
            | (DrawLifecycle::Preparing, DrawLifecycle::Idle)
            | (DrawLifecycle::Drawing, DrawLifecycle::Finishing)
            | (DrawLifecycle::Finishing, DrawLifecycle::Idle)
    ) || from == to
}
