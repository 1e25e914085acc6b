use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inflow,
    Outflow,
}

impl Direction {
    /// Place an unsigned amount into `(amount_in, amount_out)`.
    pub fn split(self, amount: Option<Decimal>) -> (Option<Decimal>, Option<Decimal>) {
        match self {
            Direction::Inflow => (amount, None),
            Direction::Outflow => (None, amount),
        }
    }
}

/// Direction implied by moving from `previous` to `current` balance.
pub fn infer(previous: Decimal, current: Decimal) -> Direction {
    if current > previous {
        Direction::Inflow
    } else {
        Direction::Outflow
    }
}

/// The most recently known account balance within one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningBalance {
    last: Option<Decimal>,
}

impl RunningBalance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Decimal> {
        self.last
    }

    /// Set from a "balance brought forward" figure.
    pub fn seed(&mut self, balance: Decimal) {
        self.last = Some(balance);
    }

    /// Record a transaction's balance without resolving anything.
    pub fn observe(&mut self, balance: Option<Decimal>) {
        if let Some(b) = balance {
            self.last = Some(b);
        }
    }

    /// Balance-delta resolution.
    ///
    /// A rise over the last known balance is an inflow, anything else an
    /// outflow. With no prior balance, or no balance on the line, the answer
    /// defaults to outflow. The new balance becomes the running balance
    /// either way.
    pub fn resolve(&mut self, balance: Option<Decimal>) -> Direction {
        let direction = match (self.last, balance) {
            (Some(previous), Some(current)) => infer(previous, current),
            _ => {
                tracing::debug!(
                    previous = ?self.last,
                    current = ?balance,
                    "direction undetermined, defaulting to outflow"
                );
                Direction::Outflow
            }
        };
        self.observe(balance);
        direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balance_drop_is_outflow() {
        let mut running = RunningBalance::new();
        running.seed(dec!(500.00));
        assert_eq!(running.resolve(Some(dec!(450.00))), Direction::Outflow);
        assert_eq!(running.get(), Some(dec!(450.00)));
    }

    #[test]
    fn test_balance_rise_is_inflow() {
        let mut running = RunningBalance::new();
        running.seed(dec!(500.00));
        assert_eq!(running.resolve(Some(dec!(550.00))), Direction::Inflow);
    }

    #[test]
    fn test_unchanged_balance_is_outflow() {
        let mut running = RunningBalance::new();
        running.seed(dec!(10));
        assert_eq!(running.resolve(Some(dec!(10))), Direction::Outflow);
    }

    #[test]
    fn test_no_prior_balance_defaults_to_outflow_and_seeds() {
        let mut running = RunningBalance::new();
        assert_eq!(running.resolve(Some(dec!(900))), Direction::Outflow);
        assert_eq!(running.get(), Some(dec!(900)));
        assert_eq!(running.resolve(Some(dec!(950))), Direction::Inflow);
    }

    #[test]
    fn test_missing_balance_keeps_running_value() {
        let mut running = RunningBalance::new();
        running.seed(dec!(10));
        assert_eq!(running.resolve(None), Direction::Outflow);
        assert_eq!(running.get(), Some(dec!(10)));
    }

    #[test]
    fn test_split() {
        assert_eq!(Direction::Inflow.split(Some(dec!(5))), (Some(dec!(5)), None));
        assert_eq!(Direction::Outflow.split(Some(dec!(5))), (None, Some(dec!(5))));
    }
}
