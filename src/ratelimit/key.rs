//! Client key generation.

/// A key that identifies one client on one route in the statistics store.
///
/// The key is composed of the literal request path and the caller's network
/// address. Equivalent paths reached through different URL forms produce
/// different keys; no collision avoidance is attempted beyond the string
/// composition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey {
    /// The literal path of the request target
    pub path: String,
    /// The caller's network address
    pub address: String,
}

impl ClientKey {
    /// Create a new client key from a request path and caller address.
    pub fn new(path: &str, address: &str) -> Self {
        Self {
            path: path.to_string(),
            address: address.to_string(),
        }
    }

    /// Convert the client key to the string used against the store.
    pub fn to_string_key(&self) -> String {
        format!("{}_{}", self.path, self.address)
    }
}

impl std::fmt::Display for ClientKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_key())
    }
}
