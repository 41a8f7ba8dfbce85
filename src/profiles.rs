use rand::Rng;

const TAGS: &[&str] = &[
    "Coffee",
    "Hiking",
    "Movies",
    "Live Music",
    "Board Games",
    "Cats",
    "Dogs",
    "Traveler",
    "Foodie",
    "Tech",
    "Art",
    "Runner",
    "Climbing",
    "Books",
    "Yoga",
    "Photography",
];

const FIRST_NAMES: &[&str] = &[
    "Alex", "Sam", "Jordan", "Taylor", "Casey", "Avery", "Riley", "Morgan", "Quinn", "Cameron",
    "Jamie", "Drew", "Parker", "Reese", "Emerson", "Rowan", "Shawn", "Harper", "Skyler", "Devon",
];

const CITIES: &[&str] = &[
    "Brooklyn",
    "Manhattan",
    "Queens",
    "Jersey City",
    "Hoboken",
    "Astoria",
    "Williamsburg",
    "Bushwick",
    "Harlem",
    "Lower East Side",
];

const JOBS: &[&str] = &[
    "Product Designer",
    "Software Engineer",
    "Data Analyst",
    "Barista",
    "Teacher",
    "Photographer",
    "Architect",
    "Chef",
    "Nurse",
    "Marketing Manager",
    "UX Researcher",
];

const BIOS: &[&str] = &[
    "Weekend hikes and weekday lattes.",
    "Dog parent. Amateur chef. Karaoke enthusiast.",
    "Trying every taco in the city, for science.",
    "Bookstore browser and movie quote machine.",
    "Gym sometimes, Netflix always.",
    "Looking for the best slice in town.",
    "Will beat you at Mario Kart.",
    "Currently planning the next trip.",
];

const PHOTO_SEEDS: &[&str] = &[
    "1515462277126-2b47b9fa09e6",
    "1520975916090-3105956dac38",
    "1519340241574-2cec6aef0c01",
    "1554151228-14d9def656e4",
    "1548142813-c348350df52b",
    "1517841905240-472988babdf9",
    "1535713875002-d1d0cf377fde",
    "1545996124-0501ebae84d0",
    "1524504388940-b1c1722653e1",
    "1531123897727-8f129e1688ce",
];

pub const MIN_AGE: u32 = 18;
const AGE_SPAN: u32 = 22;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub city: String,
    pub title: String,
    pub bio: String,
    pub tags: Vec<String>,
    pub photos: Vec<String>,
    photo_index: usize,
}

impl Profile {
    pub fn photo_index(&self) -> usize {
        self.photo_index
    }

    pub fn current_photo(&self) -> &str {
        self.photos
            .get(self.photo_index)
            .or_else(|| self.photos.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Advances to the next photo, wrapping after the last one.
    pub fn next_photo(&mut self) -> usize {
        let count = self.photos.len().max(1);
        self.photo_index = (self.photo_index + 1) % count;
        self.photo_index
    }

    pub fn meta_line(&self) -> String {
        format!("{} • {}", self.title, self.city)
    }

    pub fn photo_alt(&self) -> String {
        format!("{} — profile photo", self.name)
    }
}

/// Shape of a generated batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchShape {
    pub count: usize,
    pub photos_per_profile: usize,
    pub tag_draws: usize,
}

impl Default for BatchShape {
    fn default() -> Self {
        Self {
            count: 12,
            photos_per_profile: 3,
            tag_draws: 4,
        }
    }
}

pub fn generate_profiles(shape: BatchShape, batch: u64, rng: &mut impl Rng) -> Vec<Profile> {
    let stamp = base36(batch);
    let photo_count = shape.photos_per_profile.max(1);

    (0..shape.count)
        .map(|index| Profile {
            id: format!("p_{}_{}", index, stamp),
            name: sample(FIRST_NAMES, rng).to_owned(),
            age: MIN_AGE + rng.gen_range(0..AGE_SPAN),
            city: sample(CITIES, rng).to_owned(),
            title: sample(JOBS, rng).to_owned(),
            bio: sample(BIOS, rng).to_owned(),
            tags: pick_tags(shape.tag_draws, rng),
            photos: (0..photo_count)
                .map(|_| photo_url(sample(PHOTO_SEEDS, rng)))
                .collect(),
            photo_index: 0,
        })
        .collect()
}

/// Draws `draws` tags with replacement and drops repeats, keeping first-draw order.
pub fn pick_tags(draws: usize, rng: &mut impl Rng) -> Vec<String> {
    let mut tags: Vec<String> = Vec::with_capacity(draws);
    for _ in 0..draws.max(1) {
        let tag = sample(TAGS, rng);
        if !tags.iter().any(|existing| existing == tag) {
            tags.push(tag.to_owned());
        }
    }
    tags
}

pub fn photo_url(seed: &str) -> String {
    format!(
        "https://images.unsplash.com/photo-{}?auto=format&fit=crop&w=1200&q=80",
        seed
    )
}

fn sample<'a>(pool: &[&'a str], rng: &mut impl Rng) -> &'a str {
    pool[rng.gen_range(0..pool.len())]
}

fn base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_owned();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
