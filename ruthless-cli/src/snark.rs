//! Terminal feedback: turns core feedback events into insults.

use rand::seq::SliceRandom;
use ruthless_core::{FeedbackEvent, FeedbackSink};

const DEFAULT_NAME: &str = "Pathetic User";

const WELCOME: [&str; 3] = [
    "Oh, you're back, ${nickname}. I assume you've finished everything? Of course not.",
    "Welcome to your dashboard of disappointment, ${nickname}.",
    "Try not to fail too much today, ${nickname}. No promises, though.",
];

const TASK_ADDED: [&str; 3] = [
    "Another burden added, ${nickname}? You can't even handle what you have.",
    "A new promise you'll inevitably break, ${nickname}. Typical.",
    "Sure, ${nickname}, add that to the pile of things you'll never finish.",
];

const TASK_COMPLETED: [&str; 3] = [
    "You did the bare minimum, ${nickname}. Congratulations.",
    "Finally, ${nickname}. Only three days late. Stunning work.",
    "Wow, you actually finished something, ${nickname}. Is the world ending?",
];

const TASK_ABANDONED: [&str; 3] = [
    "Chicken, ${nickname}. You gave up. Pathetic.",
    "Another failure for the record, ${nickname}. Weak.",
    "Giving up is the only thing you're actually good at, ${nickname}.",
];

const IDLE_SHAME: [&str; 3] = [
    "The clock is ticking, ${nickname}, and you're just staring at me. Pathetic.",
    "Still here, ${nickname}? Those deadlines aren't moving themselves.",
    "I can smell the procrastination from here, ${nickname}.",
];

const TASK_OVERDUE: [&str; 1] = ["DEADLINE MISSED, ${nickname}. It's in the record now."];

const VALOR_STOLEN: [&str; 1] = [
    "Your standing is so bad, ${nickname}, that a completed task was confiscated. You didn't deserve it.",
];

const CHEATING: [&str; 1] = ["Moving the goalposts, ${nickname}? Noted. Permanently."];

const SHAMED: [&str; 1] = ["Deleting it won't help, ${nickname}. The Hall of Shame never forgets."];

fn phrases(event: &FeedbackEvent) -> &'static [&'static str] {
    match event {
        FeedbackEvent::Welcome => &WELCOME,
        FeedbackEvent::TaskAdded { .. } => &TASK_ADDED,
        FeedbackEvent::TaskCompleted { .. } => &TASK_COMPLETED,
        FeedbackEvent::TaskAbandoned { .. } => &TASK_ABANDONED,
        FeedbackEvent::TaskOverdue { .. } => &TASK_OVERDUE,
        FeedbackEvent::ValorStolen { .. } => &VALOR_STOLEN,
        FeedbackEvent::CheatingDetected { .. } => &CHEATING,
        FeedbackEvent::TaskShamed { .. } => &SHAMED,
        FeedbackEvent::IdleShame => &IDLE_SHAME,
    }
}

pub fn personalize(phrase: &str, nickname: Option<&str>) -> String {
    let name = nickname.filter(|n| !n.trim().is_empty()).unwrap_or(DEFAULT_NAME);
    phrase.replace("${nickname}", name)
}

/// Random phrase for `event`, with the nickname filled in.
pub fn phrase_for(event: &FeedbackEvent, nickname: Option<&str>) -> String {
    let phrase = phrases(event)
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or_default();
    personalize(phrase, nickname)
}

/// Prints to stderr so `--json` output on stdout stays machine-readable.
#[derive(Debug, Clone, Copy)]
pub struct TerminalSink {
    pub muted: bool,
}

impl FeedbackSink for TerminalSink {
    fn notify(&mut self, event: &FeedbackEvent, nickname: Option<&str>) {
        if self.muted {
            return;
        }
        eprintln!(">> {}", phrase_for(event, nickname));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_nickname_or_default() {
        assert_eq!(
            personalize("Weak, ${nickname}. Very weak, ${nickname}.", Some("Sam")),
            "Weak, Sam. Very weak, Sam."
        );
        assert_eq!(personalize("Hi ${nickname}", None), "Hi Pathetic User");
        assert_eq!(personalize("Hi ${nickname}", Some("  ")), "Hi Pathetic User");
    }

    #[test]
    fn every_event_has_a_phrase() {
        let events = [
            FeedbackEvent::Welcome,
            FeedbackEvent::TaskAdded { task_id: "t".into() },
            FeedbackEvent::TaskCompleted { task_id: "t".into() },
            FeedbackEvent::TaskAbandoned { task_id: "t".into() },
            FeedbackEvent::TaskOverdue { task_id: "t".into() },
            FeedbackEvent::ValorStolen { task_id: "t".into() },
            FeedbackEvent::CheatingDetected { task_id: "t".into() },
            FeedbackEvent::TaskShamed { task_id: "t".into() },
            FeedbackEvent::IdleShame,
        ];
        for ev in &events {
            let p = phrase_for(ev, Some("Kai"));
            assert!(p.contains("Kai"), "{ev:?} -> {p}");
            assert!(!p.contains("${nickname}"));
        }
    }

    #[test]
    fn abandon_phrase_comes_from_its_category() {
        let p = phrase_for(&FeedbackEvent::TaskAbandoned { task_id: "t".into() }, Some("X"));
        assert!(TASK_ABANDONED.iter().any(|tpl| personalize(tpl, Some("X")) == p));
    }
}
