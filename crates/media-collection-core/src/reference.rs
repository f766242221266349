/// The official Eon Productions films, in release order
pub const EON_TITLES: [&str; 25] = [
    "Dr. No",
    "From Russia with Love",
    "Goldfinger",
    "Thunderball",
    "You Only Live Twice",
    "On Her Majesty's Secret Service",
    "Diamonds Are Forever",
    "Live and Let Die",
    "The Man with the Golden Gun",
    "The Spy Who Loved Me",
    "Moonraker",
    "For Your Eyes Only",
    "Octopussy",
    "A View to a Kill",
    "The Living Daylights",
    "Licence to Kill",
    "GoldenEye",
    "Tomorrow Never Dies",
    "The World Is Not Enough",
    "Die Another Day",
    "Casino Royale",
    "Quantum of Solace",
    "Skyfall",
    "Spectre",
    "No Time to Die",
];

/// The 1967 spoof and the non-Eon Connery film
pub const NON_EON_TITLES: [&str; 2] = ["Casino Royale (1967)", "Never Say Never Again"];

/// Ordered search keys. Order is search order only; it does not group output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceList {
    titles: Vec<String>,
}

impl ReferenceList {
    pub fn official() -> Self {
        Self::from_titles(EON_TITLES)
    }

    pub fn with_non_eon() -> Self {
        Self::from_titles(EON_TITLES.iter().chain(NON_EON_TITLES.iter()).copied())
    }

    pub fn for_config(include_non_eon: bool) -> Self {
        if include_non_eon {
            Self::with_non_eon()
        } else {
            Self::official()
        }
    }

    pub fn from_titles<I, T>(titles: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            titles: titles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.titles.iter().map(String::as_str)
    }
}
