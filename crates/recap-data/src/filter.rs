//! Year-window and role-scope filtering.

use recap_core::config::RoleScope;
use recap_core::models::{Conversation, Message};
use recap_core::time_utils::LocalCalendar;
use tracing::debug;

/// The filtered view plus what was left out and why.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    /// Conversations with at least one kept message, in input order.
    pub conversations: Vec<Conversation>,
    /// Messages outside the role scope.
    pub out_of_scope: usize,
    /// Timed messages whose local date falls outside the year.
    pub out_of_year: usize,
    /// Messages with no resolvable instant, dropped because a year was set.
    pub excluded_untimed: usize,
}

impl FilterOutcome {
    pub fn message_count(&self) -> usize {
        self.conversations.iter().map(|c| c.messages.len()).sum()
    }
}

/// Keep the messages within `scope` and, when `year` is set, within that
/// local calendar year.
///
/// A message without its own timestamp is placed by its conversation's
/// time. With a year set, a message with neither cannot be placed and is
/// excluded. Conversations left with no messages are dropped; the input is
/// never modified.
pub fn filter_records(
    conversations: &[Conversation],
    year: Option<i32>,
    scope: &RoleScope,
    calendar: &LocalCalendar,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    for conv in conversations {
        let kept: Vec<Message> = conv
            .messages
            .iter()
            .filter(|msg| {
                if !scope.contains(msg.role) {
                    outcome.out_of_scope += 1;
                    return false;
                }
                let Some(year) = year else {
                    return true;
                };
                match conv.message_time(msg) {
                    Some(at) if calendar.year(at) == year => true,
                    Some(_) => {
                        outcome.out_of_year += 1;
                        false
                    }
                    None => {
                        outcome.excluded_untimed += 1;
                        false
                    }
                }
            })
            .cloned()
            .collect();

        if !kept.is_empty() {
            outcome.conversations.push(conv.with_messages(kept));
        }
    }

    debug!(
        "Filter kept {} messages in {} conversations ({} out of scope, {} out of year, {} untimed)",
        outcome.message_count(),
        outcome.conversations.len(),
        outcome.out_of_scope,
        outcome.out_of_year,
        outcome.excluded_untimed
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone as _, Utc};
    use chrono_tz::Tz;
    use recap_core::models::Role;

    fn msg(id: &str, role: Role, ts: Option<DateTime<Utc>>) -> Message {
        Message::new(id, "c1", role, None, ts, "hello world")
    }

    fn conv(created: Option<DateTime<Utc>>, messages: Vec<Message>) -> Conversation {
        Conversation {
            id: "c1".into(),
            title: "t".into(),
            created_at: created,
            updated_at: None,
            messages,
        }
    }

    // ── role scope ────────────────────────────────────────────────────────────

    #[test]
    fn test_role_scope_keeps_only_selected_roles() {
        let input = vec![conv(
            None,
            vec![
                msg("u1", Role::User, None),
                msg("a1", Role::Assistant, None),
                msg("u2", Role::User, None),
            ],
        )];
        let scope = RoleScope::from_names(["assistant"]).unwrap();
        let out = filter_records(&input, None, &scope, &LocalCalendar::default());

        assert_eq!(out.message_count(), 1);
        assert_eq!(out.conversations[0].messages[0].id, "a1");
        assert_eq!(out.out_of_scope, 2);
        assert_eq!(input[0].messages.len(), 3);
    }

    #[test]
    fn test_all_scope_keeps_unknown_role() {
        let input = vec![conv(None, vec![msg("x", Role::Unknown, None)])];
        let out = filter_records(&input, None, &RoleScope::all(), &LocalCalendar::default());
        assert_eq!(out.message_count(), 1);
        assert_eq!(out.excluded_untimed, 0);
    }

    #[test]
    fn test_conversation_dropped_when_nothing_kept() {
        let input = vec![conv(None, vec![msg("u", Role::User, None)])];
        let scope = RoleScope::from_names(["tool"]).unwrap();
        let out = filter_records(&input, None, &scope, &LocalCalendar::default());
        assert!(out.conversations.is_empty());
    }

    // ── year window ───────────────────────────────────────────────────────────

    #[test]
    fn test_year_uses_local_calendar() {
        // 2024-01-01 03:00 UTC is still 2023-12-31 in New York.
        let late_2023_local = Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap();
        let early_2024_local = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let input = vec![conv(
            None,
            vec![
                msg("a", Role::User, Some(late_2023_local)),
                msg("b", Role::User, Some(early_2024_local)),
            ],
        )];
        let calendar = LocalCalendar::new(Tz::America__New_York);
        let out = filter_records(&input, Some(2024), &RoleScope::all(), &calendar);

        assert_eq!(out.message_count(), 1);
        assert_eq!(out.conversations[0].messages[0].id, "b");
        assert_eq!(out.out_of_year, 1);
    }

    #[test]
    fn test_year_falls_back_to_conversation_time() {
        let created = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let input = vec![conv(Some(created), vec![msg("a", Role::User, None)])];
        let out = filter_records(&input, Some(2024), &RoleScope::all(), &LocalCalendar::default());
        assert_eq!(out.message_count(), 1);
    }

    #[test]
    fn test_year_excludes_untimed_and_counts_them() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let input = vec![conv(
            None,
            vec![msg("timed", Role::User, Some(ts)), msg("untimed", Role::User, None)],
        )];
        let out = filter_records(&input, Some(2024), &RoleScope::all(), &LocalCalendar::default());
        assert_eq!(out.message_count(), 1);
        assert_eq!(out.excluded_untimed, 1);
    }

    #[test]
    fn test_role_is_checked_before_year() {
        let input = vec![conv(None, vec![msg("u", Role::User, None)])];
        let scope = RoleScope::from_names(["assistant"]).unwrap();
        let out = filter_records(&input, Some(2024), &scope, &LocalCalendar::default());
        assert_eq!(out.out_of_scope, 1);
        assert_eq!(out.excluded_untimed, 0);
    }
}
