/// Convert a number of milliseconds to a clock string in the format "M:SS".
/// Hours are added as "H:MM:SS" once the duration reaches an hour.
pub fn millis_to_clock_string(millis: u64) -> String {
    let seconds = millis / 1000;
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let seconds = seconds % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
