/// GSM 03.38 basic set and extension table.
const GSM_CHARACTERS: &str = concat!(
    "@£$¥èéùìòÇ\nØø\rÅåΔ_ΦΓΛΩΠΨΣΘΞ\u{1b}ÆæßÉ !\"#¤%&'()*+,-./0123456789:;<=>?",
    "¡ABCDEFGHIJKLMNOPQRSTUVWXYZÄÖÑÜ§¿abcdefghijklmnopqrstuvwxyzäöñüà",
    "^{}\\[~]|€",
);

/// Accented letters French text needs, sent as-is.
const FRENCH_CHARACTERS: &str = "àâæçéèêëîïôœùûüÿÀÂÆÇÉÈÊËÎÏÔŒÙÛÜŸ";

/// Characters swapped for a plain equivalent when the message is sent.
const DOWNGRADABLE_CHARACTERS: &str = "“”‘’–—…\u{200B}\u{00A0}\t";

pub fn is_sms_compatible(c: char) -> bool {
    GSM_CHARACTERS.contains(c) || FRENCH_CHARACTERS.contains(c) || DOWNGRADABLE_CHARACTERS.contains(c)
}

/// Characters in `content` a text message can't carry, each listed once.
pub fn non_sms_characters(content: &str) -> Vec<char> {
    let mut found = Vec::new();
    for c in content.chars() {
        if !is_sms_compatible(c) && !found.contains(&c) {
            found.push(c);
        }
    }
    found
}

/// Validation message for SMS content, or `None` when every character is
/// allowed.
pub fn sms_content_error(content: &str) -> Option<String> {
    let bad = non_sms_characters(content);
    if bad.is_empty() {
        return None;
    }
    let listed: Vec<String> = bad.iter().map(char::to_string).collect();
    Some(format!("You can’t use {} in text messages.", listed.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_french_text_is_allowed() {
        assert_eq!(sms_content_error("Bonjour ((name)), votre rendez-vous est à 10h. Ça va?"), None);
    }

    #[test]
    fn test_downgradable_characters_are_allowed() {
        let content = "here:\tare some “fancy quotes” and non\u{200B}breaking\u{200B}spaces";
        assert_eq!(sms_content_error(content), None);
    }

    #[test]
    fn test_emoji_is_rejected() {
        assert_eq!(
            sms_content_error("here are some noodles 🍜").as_deref(),
            Some("You can’t use 🍜 in text messages.")
        );
    }

    #[test]
    fn test_each_bad_character_listed_once() {
        assert_eq!(non_sms_characters("🍔 and 🍔 and 🍜"), vec!['🍔', '🍜']);
    }
}
