//! Intent shortcuts: symbolic action ids expanded into canonical prompts.

pub struct QuickAction {
    pub id: &'static str,
    pub prompt: &'static str,
}

const QUICK_ACTIONS: &[QuickAction] = &[
    QuickAction {
        id: "validate_data",
        prompt: "Please validate my data quality",
    },
    QuickAction {
        id: "detect_anomalies",
        prompt: "Please detect anomalies in my data",
    },
    QuickAction {
        id: "check_completeness",
        prompt: "Please check the completeness of my data",
    },
    QuickAction {
        id: "get_insights",
        prompt: "Please give me insights about my campaign data",
    },
    QuickAction {
        id: "fix_data",
        prompt: "Please fix the data quality issues",
    },
    QuickAction {
        id: "fix_anomalies",
        prompt: "Please fix the detected anomalies",
    },
];

#[derive(Debug, Clone, Copy, Default)]
pub struct QuickActionDispatcher;

impl QuickActionDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Total: unknown ids are returned verbatim as the prompt.
    pub fn resolve<'a>(&self, action_id: &'a str) -> &'a str {
        QUICK_ACTIONS
            .iter()
            .find(|action| action.id == action_id)
            .map(|action| action.prompt)
            .unwrap_or(action_id)
    }

    pub fn actions(&self) -> &'static [QuickAction] {
        QUICK_ACTIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_map_to_canonical_prompts() {
        let dispatcher = QuickActionDispatcher::new();
        assert_eq!(
            dispatcher.resolve("validate_data"),
            "Please validate my data quality"
        );
        assert_eq!(
            dispatcher.resolve("get_insights"),
            "Please give me insights about my campaign data"
        );
    }

    #[test]
    fn unknown_ids_pass_through() {
        let dispatcher = QuickActionDispatcher::new();
        assert_eq!(dispatcher.resolve("unknown_xyz"), "unknown_xyz");
        assert_eq!(dispatcher.resolve(""), "");
        // Lookup is exact, not case-folded
        assert_eq!(dispatcher.resolve("VALIDATE_DATA"), "VALIDATE_DATA");
    }

    #[test]
    fn ids_are_unique() {
        let dispatcher = QuickActionDispatcher::new();
        let mut ids: Vec<_> = dispatcher.actions().iter().map(|a| a.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), dispatcher.actions().len());
    }
}
