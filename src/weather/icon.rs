//! Condition description to icon name mapping
//!
//! The display surface renders a weather glyph chosen by the API's
//! free-text condition description. Descriptions come from a fixed
//! vocabulary; anything unknown falls back to the clear-sky icon.

/// Resolve the icon file name for a condition description
///
/// Matching is case-insensitive on the full description string.
#[must_use]
pub fn icon_for_description(description: &str) -> &'static str {
    match description.to_lowercase().as_str() {
        // Thunderstorm group
        "thunderstorm with light rain"
        | "thunderstorm with rain"
        | "thunderstorm with heavy rain"
        | "light thunderstorm"
        | "thunderstorm"
        | "heavy thunderstorm"
        | "ragged thunderstorm"
        | "thunderstorm with light drizzle"
        | "thunderstorm with drizzle"
        | "thunderstorm with heavy drizzle" => "thunderstorm.png",

        // Drizzle and rain groups
        "light intensity drizzle"
        | "drizzle"
        | "heavy intensity drizzle"
        | "light intensity drizzle rain"
        | "drizzle rain"
        | "heavy intensity drizzle rain"
        | "shower rain and drizzle"
        | "heavy shower rain and drizzle"
        | "shower drizzle"
        | "light rain"
        | "moderate rain"
        | "heavy intensity rain"
        | "very heavy rain"
        | "extreme rain"
        | "freezing rain"
        | "light intensity shower rain"
        | "shower rain"
        | "heavy intensity shower rain"
        | "ragged shower rain" => "rainy.png",

        // Snow group ("squalls" renders as snow, matching the display art)
        "light snow"
        | "snow"
        | "heavy snow"
        | "sleet"
        | "light shower sleet"
        | "shower sleet"
        | "light rain and snow"
        | "rain and snow"
        | "light shower snow"
        | "shower snow"
        | "heavy shower snow"
        | "squalls" => "snow.png",

        // Atmosphere group
        "mist" | "fog" => "fog.png",
        "smoke" | "haze" => "cloudy.png",
        "sand/dust whirls" | "sand" | "dust" | "volcanic ash" => "sandstorm.png",
        "tornado" => "tornado.png",

        // Clear and clouds group
        "few clouds" => "partly_cloudy.png",
        "scattered clouds" => "partly_clouds.png",
        "broken clouds" | "overcast clouds" => "cloudy.png",

        // "clear sky" and anything unrecognized
        _ => "default_sun.png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_groups_resolve() {
        assert_eq!(icon_for_description("thunderstorm"), "thunderstorm.png");
        assert_eq!(icon_for_description("light rain"), "rainy.png");
        assert_eq!(icon_for_description("shower drizzle"), "rainy.png");
        assert_eq!(icon_for_description("heavy snow"), "snow.png");
        assert_eq!(icon_for_description("mist"), "fog.png");
        assert_eq!(icon_for_description("volcanic ash"), "sandstorm.png");
        assert_eq!(icon_for_description("tornado"), "tornado.png");
        assert_eq!(icon_for_description("few clouds"), "partly_cloudy.png");
        assert_eq!(icon_for_description("overcast clouds"), "cloudy.png");
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(icon_for_description("Light Rain"), "rainy.png");
        assert_eq!(icon_for_description("BROKEN CLOUDS"), "cloudy.png");
    }

    #[test]
    fn clear_sky_and_unknown_fall_back_to_sun() {
        assert_eq!(icon_for_description("clear sky"), "default_sun.png");
        assert_eq!(icon_for_description("raining frogs"), "default_sun.png");
    }
}
