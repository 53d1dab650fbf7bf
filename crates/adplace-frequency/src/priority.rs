//! Priority ordering and priority-weighted selection

use std::cmp::Reverse;

use adplace_core::Ad;
use rand::Rng;

/// Best first. Stable: equal priorities keep candidate order.
pub fn sort_by_priority<'a>(mut ads: Vec<&'a Ad>) -> Vec<&'a Ad> {
    ads.sort_by_key(|ad| Reverse(ad.priority));
    ads
}

/// Draw one ad with probability proportional to its priority.
///
/// Equivalent to drawing uniformly from a pool where each ad appears `priority`
/// times. Returns `None` only for an empty slice.
pub fn weighted_random<'a, R: Rng + ?Sized>(ads: &[&'a Ad], rng: &mut R) -> Option<&'a Ad> {
    let total: u32 = ads.iter().map(|ad| ad.priority.weight()).sum();
    if total == 0 {
        return ads.first().copied();
    }

    let mut ticket = rng.gen_range(0..total);
    for ad in ads {
        let weight = ad.priority.weight();
        if ticket < weight {
            return Some(*ad);
        }
        ticket -= weight;
    }
    ads.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use adplace_core::AdId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_sort_is_stable_descending() {
        let ads = vec![
            Ad::new(1, "code").with_priority(3),
            Ad::new(2, "code").with_priority(8),
            Ad::new(3, "code").with_priority(3),
            Ad::new(4, "code").with_priority(8),
            Ad::new(5, "code"),
        ];
        let sorted: Vec<u64> = sort_by_priority(ads.iter().collect())
            .into_iter()
            .map(|ad| ad.id.0)
            .collect();
        assert_eq!(sorted, vec![2, 4, 5, 1, 3]);
    }

    #[test]
    fn test_weighted_random_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(weighted_random(&[], &mut rng).is_none());
    }

    #[test]
    fn test_weighted_random_single() {
        let ad = Ad::new(7, "code").with_priority(1);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(weighted_random(&[&ad], &mut rng).map(|a| a.id), Some(AdId(7)));
        }
    }

    #[test]
    fn test_weighted_random_ratio() {
        let heavy = Ad::new(1, "code").with_priority(10);
        let light = Ad::new(2, "code").with_priority(1);
        let candidates = [&heavy, &light];
        let mut rng = StdRng::seed_from_u64(0x5eed);

        let mut heavy_hits = 0u32;
        let mut light_hits = 0u32;
        for _ in 0..10_000 {
            match weighted_random(&candidates, &mut rng).map(|a| a.id) {
                Some(AdId(1)) => heavy_hits += 1,
                Some(AdId(2)) => light_hits += 1,
                other => panic!("unexpected pick {:?}", other),
            }
        }

        assert!(light_hits > 0, "low priority ads must stay reachable");
        let ratio = f64::from(heavy_hits) / f64::from(light_hits);
        assert!((8.0..12.5).contains(&ratio), "ratio was {ratio:.2}");
    }
}
