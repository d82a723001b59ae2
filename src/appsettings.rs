use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimeFormat {
    #[serde(rename = "12h")]
    TwelveHour,
    #[serde(rename = "24h")]
    TwentyFourHour,
}

#[derive(Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ar,
    En,
}

#[derive(Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertSound {
    Adhan,
    Chime,
    Silent,
}

#[derive(Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FontSize {
    Small,
    Medium,
    Large,
}

#[derive(Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Country {
    SaudiArabia,
    UnitedArabEmirates,
    Egypt,
}

impl Country {
    pub fn timezone(&self) -> Tz {
        match self {
            Country::SaudiArabia => Tz::Asia__Riyadh,
            Country::UnitedArabEmirates => Tz::Asia__Dubai,
            Country::Egypt => Tz::Africa__Cairo,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    pub time_format: TimeFormat,
    /// Minutes between a prayer and its follow-up reminder.
    pub reminder_interval: u32,
    pub alert_sound: AlertSound,
    pub font_size: FontSize,
    pub language: Language,
    pub country: Country,
    pub notifications_enabled: bool,
}

impl AppSettings {
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("time_format", "12h")?
            .set_default("reminder_interval", 15)?
            .set_default("alert_sound", "adhan")?
            .set_default("font_size", "medium")?
            .set_default("language", "ar")?
            .set_default("country", "saudi_arabia")?
            .set_default("notifications_enabled", true)?
            .add_source(File::with_name("appsettings").required(false))
            .add_source(File::with_name("appsettings.local").required(false))
            .add_source(Environment::with_prefix("APP"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_deserialize() {
        let settings = Config::builder()
            .set_default("time_format", "12h")
            .unwrap()
            .set_default("reminder_interval", 15)
            .unwrap()
            .set_default("alert_sound", "adhan")
            .unwrap()
            .set_default("font_size", "medium")
            .unwrap()
            .set_default("language", "ar")
            .unwrap()
            .set_default("country", "saudi_arabia")
            .unwrap()
            .set_default("notifications_enabled", true)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<AppSettings>()
            .unwrap();

        assert_eq!(settings.time_format, TimeFormat::TwelveHour);
        assert_eq!(settings.reminder_interval, 15);
        assert_eq!(settings.language, Language::Ar);
        assert_eq!(settings.country.timezone(), Tz::Asia__Riyadh);
        assert!(settings.notifications_enabled);
    }
}
