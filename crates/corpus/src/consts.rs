use regex::{Regex, RegexSet};
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

macro_rules! regex_set {
    ($name:ident, [$($regex:expr),+ $(,)?]) => {
        pub(crate) static $name: LazyLock<RegexSet> = LazyLock::new(|| RegexSet::new([$($regex),+]).unwrap());
    };
}

// "Book 3", "book3", "Book_12 - Draft", but not "Bookmarks 2" or "Book 12b".
regex!(BOOK_FOLDER_REGEX, r"(?i)^book[\s_\-]*(\d+)\b");
regex_set!(
    VARIANT_REGEX_SET,
    [
        r"(?i)\bdraft\s*\d*\b",
        r"(?i)\balt(?:ernate)?\b",
        r"(?i)\brev(?:isions?)?\b",
        r"(?i)(?:^|[\s_\-.])v\d+(?:$|[\s_\-.])",
        r"(?i)\bvariant\b",
    ]
);
// Leading number of a scene title: "12 Opening", "2.5 Interlude", "07".
regex!(SCENE_NUMBER_REGEX, r"^\s*(\d+(?:\.\d+)?)");
