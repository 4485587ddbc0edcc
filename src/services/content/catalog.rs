//! Static catalogue mapping content-source identifiers to artist pools.
//!
//! Sources mirror the playlist picker in the web client; the provider draws
//! candidate tracks for a game by searching these artists.

/// Artist pool for each selectable content source.
const CATALOG: &[(&str, &[&str])] = &[
    (
        "top-charts",
        &[
            "Taylor Swift",
            "Ariana Grande",
            "Justin Bieber",
            "Harry Styles",
            "Beyonce",
            "Billie Eilish",
            "The Weeknd",
            "Ed Sheeran",
            "Drake",
            "Dua Lipa",
            "Post Malone",
            "Olivia Rodrigo",
        ],
    ),
    (
        "all-time-hits",
        &[
            "Queen",
            "Michael Jackson",
            "The Beatles",
            "Madonna",
            "Prince",
            "Whitney Houston",
            "Elton John",
            "ABBA",
            "Stevie Wonder",
            "David Bowie",
        ],
    ),
    (
        "pop-2020",
        &[
            "Dua Lipa",
            "The Weeknd",
            "Harry Styles",
            "Olivia Rodrigo",
            "Billie Eilish",
            "Ariana Grande",
            "Taylor Swift",
            "Ed Sheeran",
        ],
    ),
    (
        "rap-hits",
        &[
            "Drake",
            "Kendrick Lamar",
            "J. Cole",
            "Travis Scott",
            "Kanye West",
            "Lil Baby",
            "Future",
            "Megan Thee Stallion",
            "Cardi B",
            "Post Malone",
        ],
    ),
    (
        "old-school-hip-hop",
        &[
            "2Pac",
            "The Notorious B.I.G.",
            "Nas",
            "Wu-Tang Clan",
            "Snoop Dogg",
            "Dr. Dre",
            "Eminem",
            "Jay-Z",
            "OutKast",
            "A Tribe Called Quest",
        ],
    ),
    (
        "best-of-gen-z",
        &[
            "Juice WRLD",
            "Polo G",
            "Lil Tjay",
            "Gunna",
            "Playboi Carti",
            "Travis Scott",
            "21 Savage",
            "XXXTentacion",
            "Lil Uzi Vert",
            "Trippie Redd",
            "Lil Baby",
            "DaBaby",
            "Rod Wave",
            "Lil Durk",
            "Roddy Ricch",
            "Pop Smoke",
            "Lil Tecca",
            "The Kid LAROI",
            "Jack Harlow",
            "Denzel Curry",
        ],
    ),
    (
        "rock-classics",
        &[
            "Queen",
            "Led Zeppelin",
            "The Beatles",
            "AC/DC",
            "Guns N' Roses",
            "Red Hot Chili Peppers",
            "Pink Floyd",
            "The Rolling Stones",
            "Aerosmith",
            "Van Halen",
        ],
    ),
    (
        "metal-classics",
        &[
            "Metallica",
            "Iron Maiden",
            "Black Sabbath",
            "Slayer",
            "Megadeth",
            "Pantera",
            "Judas Priest",
            "Motorhead",
            "Anthrax",
            "Dio",
        ],
    ),
    (
        "country-hits",
        &[
            "Luke Combs",
            "Morgan Wallen",
            "Carrie Underwood",
            "Blake Shelton",
            "Keith Urban",
            "Miranda Lambert",
            "Chris Stapleton",
            "Thomas Rhett",
        ],
    ),
    (
        "80s-hits",
        &[
            "Michael Jackson",
            "Madonna",
            "Prince",
            "Queen",
            "Whitney Houston",
            "George Michael",
            "Bon Jovi",
            "U2",
            "The Police",
            "Phil Collins",
            "Cyndi Lauper",
            "Duran Duran",
            "A-ha",
            "Toto",
            "Tears for Fears",
            "The Cure",
            "Depeche Mode",
            "Eurythmics",
            "Journey",
            "Foreigner",
            "Pat Benatar",
            "Blondie",
            "Talking Heads",
            "Rick Astley",
        ],
    ),
    (
        "90s-hits",
        &[
            "Nirvana",
            "Mariah Carey",
            "Celine Dion",
            "Britney Spears",
            "Backstreet Boys",
            "Spice Girls",
            "Radiohead",
            "Red Hot Chili Peppers",
            "Green Day",
            "Pearl Jam",
            "TLC",
            "Boyz II Men",
            "Third Eye Blind",
            "Goo Goo Dolls",
            "Alice in Chains",
            "Soundgarden",
            "The Cranberries",
            "No Doubt",
            "Weezer",
            "Oasis",
            "Ace of Base",
            "Alanis Morissette",
        ],
    ),
];

/// Artist pool for a content source, if the source is known.
pub fn artists_for(source: &str) -> Option<&'static [&'static str]> {
    CATALOG
        .iter()
        .find(|(id, _)| *id == source)
        .map(|(_, artists)| *artists)
}

/// Identifiers of every selectable content source.
pub fn available_sources() -> Vec<&'static str> {
    CATALOG.iter().map(|(id, _)| *id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_source_resolves_to_non_empty_pool() {
        let artists = artists_for("best-of-gen-z").unwrap();
        assert!(artists.len() >= 4);
    }

    #[test]
    fn unknown_source_is_none() {
        assert!(artists_for("lofi-beats").is_none());
    }

    #[test]
    fn every_source_has_enough_artists_for_distractors() {
        for source in available_sources() {
            let artists = artists_for(source).unwrap();
            assert!(artists.len() >= 4, "source {source} has too few artists");
        }
    }
}
