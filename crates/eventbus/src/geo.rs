//! Country/city derivation: a pluggable collaborator. This ships one
//! deterministic synthetic implementation; a real IP-geolocation backend
//! plugs into the same trait without touching the producer/lookup call
//! sites.

const COUNTRIES: &[(&str, &str)] = &[
    ("US", "New York"),
    ("GB", "London"),
    ("DE", "Berlin"),
    ("IN", "Bengaluru"),
    ("BR", "Sao Paulo"),
    ("JP", "Tokyo"),
    ("AU", "Sydney"),
    ("CA", "Toronto"),
];

pub trait GeoResolver: Send + Sync {
    fn resolve(&self, ip_address: Option<&str>) -> (Option<String>, Option<String>);
}

/// Stable hash of the IP into a fixed country/city table. Deterministic so
/// tests and re-aggregation stay reproducible; not a real geolocation.
pub struct DeterministicGeoResolver;

impl GeoResolver for DeterministicGeoResolver {
    fn resolve(&self, ip_address: Option<&str>) -> (Option<String>, Option<String>) {
        let ip = match ip_address {
            Some(ip) if !ip.is_empty() => ip,
            _ => return (None, None),
        };
        let hash = fnv1a(ip.as_bytes());
        let (country, city) = COUNTRIES[(hash as usize) % COUNTRIES.len()];
        (Some(country.to_string()), Some(city.to_string()))
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_ip_resolves_to_same_country() {
        let resolver = DeterministicGeoResolver;
        let a = resolver.resolve(Some("203.0.113.5"));
        let b = resolver.resolve(Some("203.0.113.5"));
        assert_eq!(a, b);
        assert!(a.0.is_some());
    }

    #[test]
    fn missing_ip_resolves_to_none() {
        let resolver = DeterministicGeoResolver;
        assert_eq!(resolver.resolve(None), (None, None));
        assert_eq!(resolver.resolve(Some("")), (None, None));
    }
}
