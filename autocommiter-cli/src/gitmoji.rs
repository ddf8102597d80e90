//! Gitmoji prefixes.

use rand::seq::SliceRandom;

pub struct Gitmoji {
    pub emoji: &'static str,
    pub code: &'static str,
    pub description: &'static str,
    pub keywords: &'static [&'static str],
}

/// A message must score above this for a keyword match to count.
const MATCH_THRESHOLD: u32 = 30;
const MAX_SCORE: u32 = 100;

macro_rules! gitmoji {
    ($emoji:literal, $code:literal, $desc:literal, [$($kw:literal),* $(,)?]) => {
        Gitmoji {
            emoji: $emoji,
            code: $code,
            description: $desc,
            keywords: &[$($kw),*],
        }
    };
}

pub const GITMOJIS: &[Gitmoji] = &[
    gitmoji!("🎨", ":art:", "Improve structure/format", ["format", "structure", "style", "lint"]),
    gitmoji!("⚡", ":zap:", "Improve performance", ["performance", "speed", "optimize", "fast"]),
    gitmoji!("🔥", ":fire:", "Remove code/files", ["remove", "delete", "clean", "unused"]),
    gitmoji!("🐛", ":bug:", "Fix bug", ["fix", "bug", "issue", "error", "crash"]),
    gitmoji!("✨", ":sparkles:", "New feature", ["feature", "new", "add", "implement"]),
    gitmoji!("📝", ":memo:", "Add documentation", ["docs", "documentation", "comment", "readme"]),
    gitmoji!("🚀", ":rocket:", "Deploy stuff", ["deploy", "release", "publish", "launch"]),
    gitmoji!("💅", ":nail_care:", "Polish code", ["polish", "refine", "improve"]),
    gitmoji!("✅", ":white_check_mark:", "Add tests", ["test", "tests", "testing"]),
    gitmoji!("🔐", ":lock:", "Security fix", ["security", "auth", "encrypt"]),
    gitmoji!("⬆️", ":arrow_up:", "Upgrade dependencies", ["upgrade", "update", "dependency", "dependencies"]),
    gitmoji!("⬇️", ":arrow_down:", "Downgrade dependencies", ["downgrade"]),
    gitmoji!("📦", ":package:", "Update packages", ["package", "npm", "yarn", "bundler"]),
    gitmoji!("🔧", ":wrench:", "Configuration", ["config", "configuration", "settings"]),
    gitmoji!("🌐", ":globe_with_meridians:", "i18n/localization", ["i18n", "translation", "locale", "language"]),
    gitmoji!("♿", ":wheelchair:", "Accessibility", ["accessibility", "a11y", "aria"]),
    gitmoji!("🚨", ":rotating_light:", "Fix warnings", ["warning", "lint"]),
    gitmoji!("🔍", ":mag:", "SEO", ["seo"]),
    gitmoji!("🍎", ":apple:", "macOS fix", ["macos", "mac", "apple"]),
    gitmoji!("🐧", ":penguin:", "Linux fix", ["linux", "ubuntu"]),
    gitmoji!("🐍", ":snake:", "Python changes", ["python", "django", "flask", "pip", "pytorch"]),
    gitmoji!("📚", ":books:", "Node.js/JavaScript", ["node", "npm", "javascript", "express", "typescript"]),
    gitmoji!("🦀", ":crab:", "Rust changes", ["rust", "cargo", "tokio", "wasm"]),
    gitmoji!("☕", ":coffee:", "Java changes", ["java", "spring", "maven", "gradle", "jvm"]),
    gitmoji!("🐳", ":whale:", "Docker changes", ["docker", "container", "dockerfile", "image"]),
    gitmoji!("🐹", ":hamster:", "Go changes", ["go", "golang", "mod"]),
];

/// Keyword score of `message` against one gitmoji, capped at 100.
///
/// A contained keyword is worth 40, its first three letters another 10, and
/// each description word longer than two letters 15.
fn score(message: &str, gitmoji: &Gitmoji) -> u32 {
    let msg = message.to_lowercase();
    let mut score = 0;
    for keyword in gitmoji.keywords {
        if msg.contains(keyword) {
            score += 40;
        }
        if keyword.len() >= 3 && msg.contains(&keyword[..3]) {
            score += 10;
        }
    }
    for word in gitmoji.description.to_lowercase().split_whitespace() {
        if word.len() > 2 && msg.contains(word) {
            score += 15;
        }
    }
    score.min(MAX_SCORE)
}

/// Highest-scoring gitmoji above the threshold; the earliest wins ties.
pub fn best_match(message: &str) -> Option<&'static Gitmoji> {
    if message.trim().is_empty() {
        return None;
    }
    let mut best: Option<&'static Gitmoji> = None;
    let mut best_score = MATCH_THRESHOLD;
    for gitmoji in GITMOJIS {
        let s = score(message, gitmoji);
        if s > best_score {
            best_score = s;
            best = Some(gitmoji);
        }
    }
    best
}

/// Prefix `message` with its best gitmoji, or a random one when nothing matches.
pub fn decorate(message: &str) -> String {
    let gitmoji = best_match(message)
        .or_else(|| GITMOJIS.choose(&mut rand::thread_rng()))
        .map(|g| g.emoji)
        .unwrap_or("✨");
    format!("{gitmoji} {message}")
}
