use rand::Rng;

/// Decorative corner plants, one chosen at random per run. Purely cosmetic;
/// nothing else reads this.
pub const PLANTS: [&str; 7] = [
    "  \\|/\n --*--\n  /|\\\n  _|_",
    "  (@)\n   |\n  \\|/\n  _|_",
    " \\\\|//\n  \\|/\n   |\n  _|_",
    "  o o\n  \\|/\n   Y\n  _|_",
    "  ,,,\n (o o)\n  \\|/\n  _|_",
    "   v\n  \\|/\n  \\|/\n  _|_",
    "  * *\n * | *\n  \\|/\n  _|_",
];

pub fn pick_plant() -> &'static str {
    let index = rand::thread_rng().gen_range(0..PLANTS.len());
    PLANTS[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_plant_returns_a_known_plant() {
        for _ in 0..50 {
            assert!(PLANTS.contains(&pick_plant()));
        }
    }

    #[test]
    fn test_plants_fit_the_corner_box() {
        for plant in PLANTS {
            assert!(plant.lines().count() <= 4);
            assert!(plant.lines().all(|l| l.chars().count() <= 8));
        }
    }
}
