//! Random data for fabricated users and demo documents.

use rand::Rng;
use rand::seq::SliceRandom;

const FIRST_NAMES: &[&str] = &[
    "Amani", "Wanjiru", "Otieno", "Achieng", "Mugisha", "Uwase", "Kamau", "Njeri", "Habimana",
    "Ingabire", "Baraka", "Akinyi", "Jean", "Grace", "Samuel", "Esther",
];

const LAST_NAMES: &[&str] = &[
    "Mwangi", "Odhiambo", "Niyonzima", "Mutua", "Uwimana", "Kariuki", "Nshimiyimana", "Wekesa",
    "Mukamana", "Chebet", "Hakizimana", "Njoroge",
];

const WORDS: &[&str] = &[
    "market", "road", "village", "cell", "river", "hill", "school", "church", "centre", "junction",
];

pub fn first_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    pick(rng, FIRST_NAMES)
}

pub fn last_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    pick(rng, LAST_NAMES)
}

pub fn full_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{} {}", first_name(rng), last_name(rng))
}

pub fn email<R: Rng + ?Sized>(rng: &mut R, first: &str, last: &str) -> String {
    format!(
        "{}.{}{}@example.org",
        first.to_lowercase(),
        last.to_lowercase(),
        rng.gen_range(1..100)
    )
}

/// E.164 number on a Kenyan or Rwandan mobile prefix.
pub fn phone_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    let prefix = if rng.gen_bool(0.5) { "+2547" } else { "+2507" };
    format!("{}{:08}", prefix, rng.gen_range(0..100_000_000u32))
}

pub fn account_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{:09}", rng.gen_range(1..1_000_000_000u32))
}

pub fn sentence<R: Rng + ?Sized>(rng: &mut R) -> String {
    let words: Vec<&str> = WORDS.choose_multiple(rng, 3).copied().collect();
    let mut sentence = words.join(" ");
    if let Some(first) = sentence.get(..1).map(str::to_uppercase) {
        sentence.replace_range(..1, &first);
    }
    sentence
}

pub fn latitude<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen_range(-90.0..=90.0)
}

pub fn longitude<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen_range(-180.0..=180.0)
}

fn pick<R: Rng + ?Sized>(rng: &mut R, values: &[&str]) -> String {
    values.choose(rng).copied().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_generated_shapes() {
        let mut rng = StdRng::seed_from_u64(1);

        let phone = phone_number(&mut rng);
        assert!(phone.starts_with("+2547") || phone.starts_with("+2507"));
        assert_eq!(phone.len(), 13);

        assert_eq!(account_number(&mut rng).len(), 9);

        let address = sentence(&mut rng);
        assert_eq!(address.split(' ').count(), 3);
        assert!(address.chars().next().unwrap().is_uppercase());

        let mail = email(&mut rng, "Jane", "Doe");
        assert!(mail.starts_with("jane.doe"));
        assert!(mail.ends_with("@example.org"));
    }
}
