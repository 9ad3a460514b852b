//! Provider-neutral instance records and query filters

/// One key/value tag on an instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceTag {
    pub key: String,
    pub value: String,
}

impl InstanceTag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Instance record as reported by the provider.
///
/// Tags are kept in provider order and may repeat a key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInstance {
    pub instance_id: Option<String>,
    /// Lifecycle state name, empty when the provider omitted it
    pub state: String,
    pub private_ip_address: Option<String>,
    pub private_dns_name: Option<String>,
    pub tags: Vec<InstanceTag>,
}

impl RawInstance {
    /// Create a record with an id and state and no addressing or tags
    pub fn new(instance_id: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            instance_id: Some(instance_id.into()),
            state: state.into(),
            ..Default::default()
        }
    }

    /// Set the private IP address
    pub fn with_private_ip(mut self, ip: impl Into<String>) -> Self {
        self.private_ip_address = Some(ip.into());
        self
    }

    /// Set the private DNS name
    pub fn with_private_dns(mut self, dns: impl Into<String>) -> Self {
        self.private_dns_name = Some(dns.into());
        self
    }

    /// Append a tag
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(InstanceTag::new(key, value));
        self
    }

    /// Values of every tag with exactly this key, in order
    pub fn tag_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tags
            .iter()
            .filter(move |t| t.key == key)
            .map(|t| t.value.as_str())
    }

    /// Id for log and error messages
    pub fn display_id(&self) -> &str {
        self.instance_id.as_deref().unwrap_or("<unknown>")
    }
}

/// A provider-side filter: `name` matches any of `values`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceFilter {
    pub name: String,
    pub values: Vec<String>,
}

impl InstanceFilter {
    /// Filter on the value of tag `key`
    pub fn tag(key: &str, value: impl Into<String>) -> Self {
        Self {
            name: format!("tag:{}", key),
            values: vec![value.into()],
        }
    }
}
