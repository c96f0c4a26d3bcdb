use crate::api::GatewayError;

/// Progress of one user-triggered operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpStatus<T> {
    Idle,
    InFlight,
    Settled(Result<T, GatewayError>),
}

impl<T> Default for OpStatus<T> {
    fn default() -> Self {
        OpStatus::Idle
    }
}

impl<T> OpStatus<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, OpStatus::Idle)
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, OpStatus::InFlight)
    }

    pub fn is_settled_ok(&self) -> bool {
        matches!(self, OpStatus::Settled(Ok(_)))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            OpStatus::Settled(Ok(value)) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&GatewayError> {
        match self {
            OpStatus::Settled(Err(e)) => Some(e),
            _ => None,
        }
    }

    /// Move to `InFlight` unless already there. Returns false for a duplicate start.
    pub fn start(&mut self) -> bool {
        if self.is_in_flight() {
            return false;
        }
        *self = OpStatus::InFlight;
        true
    }

    pub fn settle(&mut self, result: Result<T, GatewayError>) {
        *self = OpStatus::Settled(result);
    }

    pub fn fail(&mut self, error: GatewayError) {
        *self = OpStatus::Settled(Err(error));
    }

    pub fn reset(&mut self) {
        *self = OpStatus::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_rejects_duplicates() {
        let mut status: OpStatus<u32> = OpStatus::default();
        assert!(status.is_idle());
        assert!(status.start());
        assert!(!status.start());
        status.settle(Ok(3));
        assert_eq!(status.value(), Some(&3));
        assert!(status.start());
    }

    #[test]
    fn test_error_accessor() {
        let mut status: OpStatus<()> = OpStatus::InFlight;
        assert!(status.error().is_none());
        status.fail(GatewayError::Network("reset by peer".into()));
        assert_eq!(
            status.error().map(|e| e.to_string()).as_deref(),
            Some("A network error occurred: reset by peer")
        );
        status.reset();
        assert!(status.is_idle());
    }
}
