use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

use crate::overs::Overs;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownName {
    pub kind: &'static str,
    pub value: String,
}

// Fixed name sets shared by the form, the JSON API and the model vocabulary.
macro_rules! named_set {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// All values ordered by display name, as offered on the form.
            pub fn sorted() -> Vec<$name> {
                let mut all = Self::ALL.to_vec();
                all.sort_by_key(|v| v.as_str());
                all
            }
        }

        impl FromStr for $name {
            type Err = UnknownName;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s.trim())
                    .ok_or_else(|| UnknownName { kind: $kind, value: s.to_string() })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

named_set! {
    /// IPL franchises known to the model.
    Team, "team" {
        SunrisersHyderabad => "Sunrisers Hyderabad",
        MumbaiIndians => "Mumbai Indians",
        RoyalChallengersBangalore => "Royal Challengers Bangalore",
        KolkataKnightRiders => "Kolkata Knight Riders",
        KingsXiPunjab => "Kings XI Punjab",
        ChennaiSuperKings => "Chennai Super Kings",
        RajasthanRoyals => "Rajasthan Royals",
        DelhiCapitals => "Delhi Capitals",
    }
}

named_set! {
    /// Host cities seen in the training data.
    City, "city" {
        Hyderabad => "Hyderabad",
        Bangalore => "Bangalore",
        Mumbai => "Mumbai",
        Indore => "Indore",
        Kolkata => "Kolkata",
        Delhi => "Delhi",
        Chandigarh => "Chandigarh",
        Jaipur => "Jaipur",
        Chennai => "Chennai",
        CapeTown => "Cape Town",
        PortElizabeth => "Port Elizabeth",
        Durban => "Durban",
        Centurion => "Centurion",
        EastLondon => "East London",
        Johannesburg => "Johannesburg",
        Kimberley => "Kimberley",
        Bloemfontein => "Bloemfontein",
        Ahmedabad => "Ahmedabad",
        Cuttack => "Cuttack",
        Nagpur => "Nagpur",
        Dharamsala => "Dharamsala",
        Visakhapatnam => "Visakhapatnam",
        Pune => "Pune",
        Raipur => "Raipur",
        Ranchi => "Ranchi",
        AbuDhabi => "Abu Dhabi",
        Sharjah => "Sharjah",
        Mohali => "Mohali",
        Bengaluru => "Bengaluru",
    }
}

/// Live state of a chase, as submitted by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub batting_team: Team,
    pub bowling_team: Team,
    pub city: City,
    pub target: u32,
    pub score: u32,
    pub overs: Overs,
    pub wickets: u8,
}

/// Win probability for each side of the chase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WinProbability {
    /// Bowling side wins.
    pub loss: f64,
    /// Batting side wins.
    pub win: f64,
}

impl WinProbability {
    pub fn from_win(win: f64) -> Self {
        Self {
            loss: 1.0 - win,
            win,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamOdds {
    pub team: Team,
    pub probability: f64,
    /// Percentage rounded to two decimals for display.
    pub percent: String,
}

impl TeamOdds {
    pub fn new(team: Team, probability: f64) -> Self {
        Self {
            team,
            probability,
            percent: format!("{:.2}", probability * 100.0),
        }
    }

    pub fn headline(&self) -> String {
        format!("Win Probability for {}: {}%", self.team, self.percent)
    }
}

#[derive(Debug, Serialize)]
pub struct Options {
    pub teams: Vec<Team>,
    pub cities: Vec<City>,
}

impl Options {
    pub fn sorted() -> Self {
        Self {
            teams: Team::sorted(),
            cities: City::sorted(),
        }
    }
}
