//! Pure display rendering. No timezone or date dependency; the scheduler
//! itself never calls into here.

use crate::appsettings::{Language, TimeFormat};
use crate::prayer::PrayerName;
use crate::reminder::TimeOfDay;

pub fn format_time(time: TimeOfDay, format: TimeFormat, language: Language) -> String {
    match format {
        TimeFormat::TwentyFourHour => format!("{:02}:{:02}", time.hour(), time.minute()),
        TimeFormat::TwelveHour => {
            let hour = match time.hour() {
                0 => 12,
                h if h > 12 => h - 12,
                h => h,
            };
            let marker = match (language, time.hour() < 12) {
                (Language::Ar, true) => "ص",
                (Language::Ar, false) => "م",
                (Language::En, true) => "AM",
                (Language::En, false) => "PM",
            };
            format!("{}:{:02} {}", hour, time.minute(), marker)
        }
    }
}

pub fn prayer_display_name(prayer: PrayerName, language: Language) -> &'static str {
    match (prayer, language) {
        (PrayerName::Fajr, Language::Ar) => "الفجر",
        (PrayerName::Dhuhr, Language::Ar) => "الظهر",
        (PrayerName::Asr, Language::Ar) => "العصر",
        (PrayerName::Maghrib, Language::Ar) => "المغرب",
        (PrayerName::Isha, Language::Ar) => "العشاء",
        (PrayerName::Fajr, Language::En) => "Fajr",
        (PrayerName::Dhuhr, Language::En) => "Dhuhr",
        (PrayerName::Asr, Language::En) => "Asr",
        (PrayerName::Maghrib, Language::En) => "Maghrib",
        (PrayerName::Isha, Language::En) => "Isha",
    }
}
