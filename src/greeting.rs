use chrono::{Local, Timelike};

/// Greeting shown above the home feed for a given hour of the day (0-23)
pub fn greeting_phrase(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    }
}

pub fn current_greeting() -> &'static str {
    greeting_phrase(Local::now().hour())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phrase_boundaries() {
        assert_eq!(greeting_phrase(0), "Good morning");
        assert_eq!(greeting_phrase(11), "Good morning");
        assert_eq!(greeting_phrase(12), "Good afternoon");
        assert_eq!(greeting_phrase(16), "Good afternoon");
        assert_eq!(greeting_phrase(17), "Good evening");
        assert_eq!(greeting_phrase(23), "Good evening");
    }
}
