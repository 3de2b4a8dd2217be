use sha2::{Digest, Sha256};

use super::{FixedReader, Header, MessageError, MessageType, NegotiateFlags, Result, VarField, Version};

/// First message of both flows: who is signing which folder, with what
/// fingerprint and client challenge.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NegotiateMessage {
    pub user_name: String,
    pub host_name: String,
    pub folder_name: String,
    pub fingerprint: String,
    pub client_challenge: Vec<u8>,
    /// Flags as decoded; recomputed from the fields on marshal.
    pub flags: NegotiateFlags,
    pub version: Version,
}

impl NegotiateMessage {
    /// Header, flags, five descriptors and the version record.
    pub const FIXED_SIZE: usize = Header::SIZE + 4 + 5 * VarField::SIZE + Version::SIZE;

    pub fn new(
        user_name: impl Into<String>,
        host_name: impl Into<String>,
        folder_name: impl Into<String>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            host_name: host_name.into(),
            folder_name: folder_name.into(),
            ..Default::default()
        }
    }

    /// Flags that go on the wire for the current field values.
    pub fn wire_flags(&self) -> NegotiateFlags {
        let mut flags = NegotiateFlags::DEFAULT;
        flags.set(NegotiateFlags::USERNAME_SUPPLIED, !self.user_name.is_empty());
        flags.set(NegotiateFlags::HOSTNAME_SUPPLIED, !self.host_name.is_empty());
        flags.set(NegotiateFlags::FOLDERNAME_SUPPLIED, !self.folder_name.is_empty());
        flags
    }

    pub fn marshal(&self) -> Result<Vec<u8>> {
        let mut next = Self::FIXED_SIZE;
        let user = VarField::allocate("user_name", &mut next, self.user_name.len())?;
        let host = VarField::allocate("host_name", &mut next, self.host_name.len())?;
        let folder = VarField::allocate("folder_name", &mut next, self.folder_name.len())?;
        let fingerprint = VarField::allocate("fingerprint", &mut next, self.fingerprint.len())?;
        let challenge =
            VarField::allocate("client_challenge", &mut next, self.client_challenge.len())?;

        let mut buf = Vec::with_capacity(next);
        buf.extend_from_slice(&Header::new(MessageType::Negotiate).serialize());
        buf.extend_from_slice(&self.wire_flags().bits().to_le_bytes());
        for field in [user, host, folder, fingerprint, challenge] {
            buf.extend_from_slice(&field.serialize());
        }
        buf.extend_from_slice(&self.version.serialize());

        buf.extend_from_slice(self.user_name.as_bytes());
        buf.extend_from_slice(self.host_name.as_bytes());
        buf.extend_from_slice(self.folder_name.as_bytes());
        buf.extend_from_slice(self.fingerprint.as_bytes());
        buf.extend_from_slice(&self.client_challenge);
        Ok(buf)
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self> {
        Header::deserialize(data, MessageType::Negotiate)?;
        let mut reader = FixedReader::after_header(data, Self::FIXED_SIZE)?;

        let flags = NegotiateFlags::from_wire(reader.u32()?);
        let user = reader.var_field()?;
        let host = reader.var_field()?;
        let folder = reader.var_field()?;
        let fingerprint = reader.var_field()?;
        let challenge = reader.var_field()?;
        let version = Version::deserialize(&reader.array::<{ Version::SIZE }>()?);

        check_presence(flags, NegotiateFlags::USERNAME_SUPPLIED, &user, "user_name")?;
        check_presence(flags, NegotiateFlags::HOSTNAME_SUPPLIED, &host, "host_name")?;
        check_presence(flags, NegotiateFlags::FOLDERNAME_SUPPLIED, &folder, "folder_name")?;

        Ok(Self {
            user_name: user.read_string_from("user_name", data)?,
            host_name: host.read_string_from("host_name", data)?,
            folder_name: folder.read_string_from("folder_name", data)?,
            fingerprint: fingerprint.read_string_from("fingerprint", data)?,
            client_challenge: challenge.read_bytes_from(data)?,
            flags,
            version,
        })
    }

    /// Store key for the (user, host, folder) triple. User and host are
    /// case-insensitive, the folder is not.
    pub fn derive_key(&self) -> String {
        derive_key(&self.user_name, &self.host_name, &self.folder_name)
    }
}

/// Lowercase hex SHA-256 of `USER-HOST-folder`.
pub fn derive_key(user_name: &str, host_name: &str, folder_name: &str) -> String {
    let material = format!(
        "{}-{}-{}",
        user_name.to_uppercase(),
        host_name.to_uppercase(),
        folder_name
    );
    hex::encode(Sha256::digest(material.as_bytes()))
}

fn check_presence(
    flags: NegotiateFlags,
    flag: NegotiateFlags,
    field: &VarField,
    name: &'static str,
) -> Result<()> {
    if flags.contains(flag) != !field.is_empty() {
        return Err(MessageError::InvalidField {
            field: name,
            reason: format!(
                "supplied flag is {} but length is {}",
                flags.contains(flag),
                field.len
            ),
        });
    }
    Ok(())
}
