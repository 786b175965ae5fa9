pub mod dice;
pub mod items;
pub mod monsters;

use bracket_terminal::prelude::{
    BLACK, BLUE, CYAN, GREEN, MAGENTA, RED, RGB, WHITE, YELLOW,
};

/// Maps a template colour name onto the palette; unknown names render white.
pub fn named_color(name: &str) -> RGB {
    match name.to_ascii_uppercase().as_str() {
        "RED" => RGB::named(RED),
        "GREEN" => RGB::named(GREEN),
        "BLUE" => RGB::named(BLUE),
        "CYAN" => RGB::named(CYAN),
        "YELLOW" => RGB::named(YELLOW),
        "MAGENTA" => RGB::named(MAGENTA),
        "BLACK" => RGB::named(BLACK),
        _ => RGB::named(WHITE),
    }
}
