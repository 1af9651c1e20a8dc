use crate::rng::Roller;

/// Ordered substring rules; the first pattern contained in the lowercased
/// message wins, so order is part of the contract.
const RULES: &[(&str, &str)] = &[
    ("おはよう", "おはようございます！今日も一日がんばりましょう ☀️"),
    ("おやすみ", "おやすみなさい、いい夢を 🌙"),
    ("こんにちは", "こんにちは！今日はどんな一日でしたか？"),
    ("こんばんは", "こんばんは！夜はゆっくり過ごしてくださいね 🌃"),
    ("ありがとう", "どういたしまして！お役に立てたならうれしいです 😊"),
    ("疲れた", "おつかれさまです。少し休憩しましょう ☕"),
    ("眠い", "無理は禁物ですよ。早めに寝ましょう 💤"),
    ("help", "`!help` でコマンド一覧が見られますよ"),
];

const DEFAULT_REPLIES: &[&str] = &[
    "なるほど、そうなんですね。",
    "それは面白いですね！もっと聞かせてください。",
    "ふむふむ、メモしておきますね 📝",
];

/// Reply for free-form text: first matching rule, otherwise a random default.
/// One default variant echoes the original (non-lowercased) text.
pub fn respond(text: &str, roller: &mut Roller) -> String {
    let lowered = text.to_lowercase();
    for (pattern, reply) in RULES {
        if lowered.contains(pattern) {
            return (*reply).to_string();
        }
    }

    // The echo template counts as one extra slot in the default pool.
    let slot = roller.range(0, DEFAULT_REPLIES.len() as i64);
    if slot == DEFAULT_REPLIES.len() as i64 {
        format!("「{}」ですか、なかなか考えさせられますね…", text.trim())
    } else {
        DEFAULT_REPLIES[slot as usize].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_rule_in_table_order_wins() {
        // Contains both おやすみ and こんにちは; おやすみ sits earlier in the table.
        let mut roller = Roller::seeded(1);
        let reply = respond("こんにちは、もうおやすみの時間？", &mut roller);
        assert_eq!(reply, "おやすみなさい、いい夢を 🌙");
    }

    #[test]
    fn matching_is_substring_not_whole_word() {
        let mut roller = Roller::seeded(2);
        let reply = respond("きょうはおはようからスタート", &mut roller);
        assert_eq!(reply, "おはようございます！今日も一日がんばりましょう ☀️");
    }

    #[test]
    fn matching_lowercases_the_input() {
        let mut roller = Roller::seeded(3);
        let reply = respond("HELP!", &mut roller);
        assert_eq!(reply, "`!help` でコマンド一覧が見られますよ");
    }

    #[test]
    fn unmatched_text_draws_from_default_pool() {
        let mut roller = Roller::seeded(4);
        let mut saw_echo_variant = false;
        for _ in 0..200 {
            let reply = respond("zzz", &mut roller);
            if reply.contains("「zzz」") {
                saw_echo_variant = true;
            } else {
                assert!(DEFAULT_REPLIES.contains(&reply.as_str()));
            }
        }
        assert!(saw_echo_variant);
    }

    #[test]
    fn echo_variant_keeps_original_casing() {
        let mut roller = Roller::seeded(5);
        for _ in 0..200 {
            let reply = respond("RustTanoshii", &mut roller);
            if reply.contains('「') {
                assert!(reply.contains("「RustTanoshii」"));
                return;
            }
        }
        panic!("echo variant never drawn");
    }
}
