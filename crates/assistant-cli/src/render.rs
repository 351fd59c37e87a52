//! Terminal rendering of assistant replies.

use assistant_core::BotReply;
use colored::Colorize;

/// Reply text followed by numbered steps and tips.
pub fn render_reply(reply: &BotReply) -> String {
    let mut sections = Vec::new();

    if !reply.reply.is_empty() {
        sections.push(reply.reply.clone());
    }
    if !reply.steps.is_empty() {
        sections.push(numbered("Steps:".yellow().bold().to_string(), &reply.steps));
    }
    if !reply.tips.is_empty() {
        sections.push(numbered("Tips:".cyan().bold().to_string(), &reply.tips));
    }

    if sections.is_empty() {
        "(no answer)".dimmed().to_string()
    } else {
        sections.join("\n\n")
    }
}

fn numbered(heading: String, items: &[String]) -> String {
    let mut out = heading;
    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!("\n  {}. {}", i + 1, item));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn renders_all_sections() {
        plain();
        let reply = BotReply::new(
            "Open the Rooms page.",
            vec!["Go to Admin".into(), "Click Add room".into()],
            vec!["Room numbers must be unique".into()],
        );
        assert_eq!(
            render_reply(&reply),
            "Open the Rooms page.\n\nSteps:\n  1. Go to Admin\n  2. Click Add room\n\nTips:\n  1. Room numbers must be unique"
        );
    }

    #[test]
    fn skips_empty_sections() {
        plain();
        let reply = BotReply::new("", vec!["Only step".into()], vec![]);
        assert_eq!(render_reply(&reply), "Steps:\n  1. Only step");
    }

    #[test]
    fn empty_reply_has_placeholder() {
        plain();
        assert_eq!(render_reply(&BotReply::default()), "(no answer)");
    }
}
