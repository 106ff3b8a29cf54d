//! Pattern data for the techno engine
//!
//! Each track is a 32-step loop at 16th-note resolution: kick and hat hit
//! masks plus bass and lead rows where 0.0 is a rest and anything else is
//! the note frequency in Hz.

/// Steps per pattern loop
pub const PATTERN_LENGTH: usize = 32;

/// Note frequencies (Hz), C minor flavored
pub mod notes {
    pub const F2: f32 = 87.31;
    pub const G2: f32 = 98.00;
    pub const A2: f32 = 110.00;
    pub const BB2: f32 = 116.54;
    pub const C3: f32 = 130.81;
    pub const D3: f32 = 146.83;
    pub const EB3: f32 = 155.56;
    pub const G4: f32 = 392.00;
    pub const A4: f32 = 440.00;
    pub const BB4: f32 = 466.16;
    pub const C5: f32 = 523.25;
    pub const D5: f32 = 587.33;
    pub const EB5: f32 = 622.25;
    pub const F5: f32 = 698.46;
    pub const G5: f32 = 783.99;
}

/// One 32-step loop across the four voices
pub struct Pattern {
    pub name: &'static str,
    pub kick: [u8; PATTERN_LENGTH],
    pub hat: [u8; PATTERN_LENGTH],
    pub bass: [f32; PATTERN_LENGTH],
    pub lead: [f32; PATTERN_LENGTH],
}

use notes::*;

/// Track pool; playback picks one at random on a fresh start.
pub static TRACKS: [Pattern; 2] = [
    Pattern {
        name: "Acid Roll",
        kick: [
            1, 0, 0, 0, 1, 0, 0, 1, 1, 0, 0, 0, 1, 0, 0, 0, //
            1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 1, 0, 1, 0, 0, 1,
        ],
        hat: [
            0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 1, 1, 0, //
            0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 1, 0, 1,
        ],
        bass: [
            C3, 0.0, 0.0, C3, 0.0, EB3, 0.0, 0.0, C3, 0.0, 0.0, C3, 0.0, G2, 0.0, 0.0, //
            C3, 0.0, 0.0, C3, 0.0, EB3, 0.0, 0.0, F2, 0.0, G2, 0.0, BB2, 0.0, C3, 0.0,
        ],
        lead: [
            0.0, 0.0, 0.0, 0.0, C5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, EB5, 0.0, D5, 0.0, //
            0.0, 0.0, 0.0, 0.0, C5, 0.0, 0.0, 0.0, G4, 0.0, BB4, 0.0, C5, 0.0, 0.0, 0.0,
        ],
    },
    Pattern {
        name: "Night Drive",
        kick: [
            1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 1, 0, //
            1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 1, 0,
        ],
        hat: [
            0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 0, 1, //
            0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 0, 1,
        ],
        bass: [
            C3, 0.0, C3, 0.0, C3, 0.0, EB3, 0.0, C3, 0.0, C3, 0.0, G2, 0.0, F2, 0.0, //
            C3, 0.0, C3, 0.0, C3, 0.0, EB3, 0.0, BB2, 0.0, G2, 0.0, F2, 0.0, G2, 0.0,
        ],
        lead: [
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, G4, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, BB4, 0.0, //
            0.0, 0.0, 0.0, 0.0, C5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, EB5, 0.0, 0.0, 0.0,
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracks_have_audible_voices() {
        for track in &TRACKS {
            assert!(track.kick.iter().any(|&k| k != 0), "{}", track.name);
            assert!(track.hat.iter().any(|&h| h != 0), "{}", track.name);
            assert!(track.bass.iter().any(|&n| n > 0.0), "{}", track.name);
            assert!(track.lead.iter().any(|&n| n > 0.0), "{}", track.name);
        }
    }

    #[test]
    fn test_bass_rows_stay_in_bass_register() {
        for track in &TRACKS {
            for &note in &track.bass {
                assert!(note == 0.0 || (notes::F2..=notes::EB3).contains(&note));
            }
        }
    }
}
