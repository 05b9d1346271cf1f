//! Risk tier classification of free-text commands.
//!
//! | Order | Set | Matches | Tier |
//! |-------|-----|---------|------|
//! | 1 | safe | read-only verbs anchored at the start (`Get-`, `dir`, `whoami`, ...) | green |
//! | 2 | destructive | deletion, formatting, security toggles, service stop, package removal | red |
//! | 3 | - | anything else | yellow |
//!
//! The safe set is evaluated strictly first: a command matching both sets is
//! green.

use crate::action::Tier;
use regex::RegexSet;
use std::sync::LazyLock;

/// Read-only commands, anchored at the start of the trimmed command.
const GREEN_PATTERNS: &[&str] = &[
    r"(?i)^Get-",
    r"(?i)^dir\b",
    r"(?i)^ls\b",
    r"(?i)^echo\b",
    r"(?i)^type\b",
    r"(?i)^cat\b",
    r"(?i)^hostname",
    r"(?i)^whoami",
    r"(?i)^ipconfig",
    r"(?i)^systeminfo",
    r"(?i)^tasklist",
];

/// Destructive commands, matched anywhere in the command.
const RED_PATTERNS: &[&str] = &[
    r"(?i)\brm\b",
    r"(?i)\bRemove-",
    r"(?i)\bdel\b",
    r"(?i)\bformat\b",
    r"(?i)\bfdisk\b",
    r"(?i)\bnet\s+user\b",
    r"(?i)\bnetsh\b.*\breset\b",
    r"(?i)\bregedit\b",
    r"(?i)\bSet-ExecutionPolicy\b",
    r"(?i)\bDisable-",
    r"(?i)\bStop-Service\b",
    r"(?i)\bUninstall-",
    r"(?i)\breg\s+(add|delete)\b",
    r"(?i)\bschtasks\b.*\s/delete\b",
];

static GREEN: LazyLock<RegexSet> =
    LazyLock::new(|| RegexSet::new(GREEN_PATTERNS).expect("green tier patterns are valid"));

static RED: LazyLock<RegexSet> =
    LazyLock::new(|| RegexSet::new(RED_PATTERNS).expect("red tier patterns are valid"));

/// Classify a literal command line. Never fails; ambiguity means yellow.
pub fn classify_tier(command: &str) -> Tier {
    let trimmed = command.trim();

    if GREEN.is_match(trimmed) {
        Tier::Green
    } else if RED.is_match(trimmed) {
        Tier::Red
    } else {
        Tier::Yellow
    }
}
