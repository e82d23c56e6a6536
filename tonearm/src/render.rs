//! Plain-text rendering of store state for the terminal.

use serde::Serialize;
use tonearm_core::{
    PlaybackContext, PreviewState, ProgressState, StoreSnapshot,
    tonearm_state::{SearchResult, Track},
    util::millis_to_clock_string,
};

pub fn json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn track_line(track: &Track) -> String {
    format!(
        "{} - {} ({}) [{}]",
        track.artist_name,
        track.name,
        millis_to_clock_string(track.duration_ms),
        track.id
    )
}

pub fn search_results(term: &str, results: &SearchResult) {
    if results.is_empty() {
        println!("No results for {term:?}");
        return;
    }

    if !results.tracks.is_empty() {
        println!("Tracks");
        for track in &results.tracks {
            println!("  {}", track_line(track));
        }
    }
    if !results.albums.is_empty() {
        println!("Albums");
        for album in &results.albums {
            println!("  {} - {} [{}]", album.artist_name, album.name, album.id);
        }
    }
    if !results.artists.is_empty() {
        println!("Artists");
        for artist in &results.artists {
            println!("  {} [{}]", artist.name, artist.id);
        }
    }
}

pub fn preview(state: &PreviewState) {
    if let Some(message) = &state.message {
        println!("{message}");
        return;
    }
    search_results(&state.term, &state.results);
}

pub fn queue(snapshot: &StoreSnapshot) {
    match &snapshot.context {
        PlaybackContext::Album(album) => {
            println!("{} by {} ({})", album.name, album.artist_name, album.release_date)
        }
        PlaybackContext::Artist(artist) => println!("Top tracks by {}", artist.name),
        PlaybackContext::None => println!("Queue"),
    }

    let current = snapshot.current_track.as_ref().map(|t| &t.id);
    for (index, track) in snapshot.track_queue.iter().enumerate() {
        let marker = if Some(&track.id) == current { ">" } else { " " };
        println!("{marker} {:>2}. {}", index + 1, track_line(track));
    }
}

pub fn artist(snapshot: &StoreSnapshot) {
    if let Some(artist) = snapshot.context.artist()
        && !artist.genres.is_empty()
    {
        println!("Genres: {}", artist.genres.join(", "));
    }
    queue(snapshot);

    if !snapshot.artist_albums.is_empty() {
        println!("Albums");
        for album in &snapshot.artist_albums {
            println!("  {} ({}) [{}]", album.name, album.release_date, album.id);
        }
    }
}

pub fn track(track: &Track) {
    println!("{}", track_line(track));
    println!("  from {}", track.album_name);
    if let Some(preview_url) = &track.preview_url {
        println!("  preview: {preview_url}");
    }
}

pub fn progress(state: &ProgressState) {
    println!(
        "{} {} / {}",
        if state.playing { "playing" } else { "stopped" },
        millis_to_clock_string(state.position_ms),
        millis_to_clock_string(state.duration_ms)
    );
}
