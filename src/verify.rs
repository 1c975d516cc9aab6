use webbrowser::Browser;

use crate::notation::MoveSequence;

const VISUAL_CUBE_BASE: &str =
    "http://cube.crider.co.uk/visualcube.png?bg=t&sch=wrgyob&size=150&alg=";

/// Image of the cube after `moves`, viewed from the front
pub fn visual_cube_url(moves: &MoveSequence) -> String {
    let compact: String = moves
        .to_string()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    format!("{VISUAL_CUBE_BASE}{compact}")
}

/// The same state seen from behind, so all six faces are covered
pub fn visual_cube_back_url(moves: &MoveSequence) -> String {
    format!("{}x2y'", visual_cube_url(moves))
}

/// Front and back images together show every sticker.
pub fn verification_urls(moves: &MoveSequence) -> [String; 2] {
    [visual_cube_url(moves), visual_cube_back_url(moves)]
}

/// Open both verification images; returns false when no browser is
/// available or neither could be opened.
pub fn open_in_browser(moves: &MoveSequence) -> bool {
    if !Browser::is_available() {
        return false;
    }
    let mut opened = false;
    for url in verification_urls(moves) {
        match webbrowser::open(&url) {
            Ok(()) => opened = true,
            Err(err) => log::warn!("could not open {url}: {err}"),
        }
    }
    opened
}
