use crate::domain::LeadStatus;

/// A lead converts only once: it must be won and no live customer may point
/// back at it yet.
pub fn can_be_converted(status: LeadStatus, has_customer: bool) -> bool {
    status == LeadStatus::Won && !has_customer
}

/// Derived from the current status, so a converted lead that is later moved
/// away from `Won` reports `false` even though its customer still exists.
pub fn is_converted(status: LeadStatus, has_customer: bool) -> bool {
    status == LeadStatus::Won && has_customer
}

#[cfg(test)]
mod tests {
    use super::{can_be_converted, is_converted};
    use crate::domain::LeadStatus;

    #[test]
    fn only_won_leads_without_customer_convert() {
        for status in LeadStatus::ALL {
            assert_eq!(can_be_converted(status, false), status == LeadStatus::Won);
            assert!(!can_be_converted(status, true));
        }
    }

    #[test]
    fn converted_flag_follows_status() {
        assert!(is_converted(LeadStatus::Won, true));
        assert!(!is_converted(LeadStatus::Won, false));
        assert!(!is_converted(LeadStatus::Lost, true));
    }
}
