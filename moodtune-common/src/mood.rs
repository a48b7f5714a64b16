//! Mood input model
//!
//! The three mood signals a playlist is generated from. Values are validated
//! once at the HTTP boundary and consumed read-only by the pipeline.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Weather category, matching the weather groups reported by the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weather {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Mist,
    Fog,
    Haze,
}

impl Weather {
    /// Every accepted weather category, in display order
    pub const ALL: [Weather; 9] = [
        Weather::Clear,
        Weather::Clouds,
        Weather::Rain,
        Weather::Drizzle,
        Weather::Thunderstorm,
        Weather::Snow,
        Weather::Mist,
        Weather::Fog,
        Weather::Haze,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weather::Clear => "Clear",
            Weather::Clouds => "Clouds",
            Weather::Rain => "Rain",
            Weather::Drizzle => "Drizzle",
            Weather::Thunderstorm => "Thunderstorm",
            Weather::Snow => "Snow",
            Weather::Mist => "Mist",
            Weather::Fog => "Fog",
            Weather::Haze => "Haze",
        }
    }

    /// Adjective used in search phrases ("rainy", "sunny", ...)
    pub fn mood_word(&self) -> &'static str {
        match self {
            Weather::Clear => "sunny",
            Weather::Clouds => "cloudy",
            Weather::Rain => "rainy",
            Weather::Drizzle => "drizzly",
            Weather::Thunderstorm => "stormy",
            Weather::Snow => "snowy",
            Weather::Mist => "misty",
            Weather::Fog => "foggy",
            Weather::Haze => "hazy",
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weather {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Weather::ALL
            .iter()
            .copied()
            .find(|w| w.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "weather must be one of Clear, Clouds, Rain, Drizzle, Thunderstorm, Snow, Mist, Fog, Haze (got '{}')",
                    s
                ))
            })
    }
}

/// Time-of-day bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Dawn,
    Day,
    Dusk,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Dawn,
        TimeOfDay::Day,
        TimeOfDay::Dusk,
        TimeOfDay::Night,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Dawn => "dawn",
            TimeOfDay::Day => "day",
            TimeOfDay::Dusk => "dusk",
            TimeOfDay::Night => "night",
        }
    }

    /// Search keyword for the time of day
    pub fn keyword(&self) -> &'static str {
        match self {
            TimeOfDay::Dawn => "morning chill",
            TimeOfDay::Day => "daytime",
            TimeOfDay::Dusk => "evening sunset",
            TimeOfDay::Night => "night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeOfDay {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        TimeOfDay::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "time_of_day must be one of dawn, day, dusk, night (got '{}')",
                    s
                ))
            })
    }
}

/// Validated mood signals for one playlist request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodInput {
    genre: String,
    weather: Weather,
    time_of_day: TimeOfDay,
    title: Option<String>,
}

impl MoodInput {
    /// Build a mood input, rejecting a blank genre.
    ///
    /// A blank title is treated as absent.
    pub fn new(
        genre: impl Into<String>,
        weather: Weather,
        time_of_day: TimeOfDay,
        title: Option<String>,
    ) -> Result<Self> {
        let genre = genre.into().trim().to_string();
        if genre.is_empty() {
            return Err(Error::InvalidInput("genre must not be empty".to_string()));
        }

        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(Self {
            genre,
            weather,
            time_of_day,
            title,
        })
    }

    /// Parse raw request fields into a validated mood input
    pub fn parse(genre: &str, weather: &str, time_of_day: &str, title: Option<&str>) -> Result<Self> {
        Self::new(
            genre,
            weather.parse()?,
            time_of_day.parse()?,
            title.map(str::to_string),
        )
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }

    pub fn weather(&self) -> Weather {
        self.weather
    }

    pub fn time_of_day(&self) -> TimeOfDay {
        self.time_of_day
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}
