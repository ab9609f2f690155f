use serde::{Deserialize, Serialize};

/// WeChat Pay merchant id (digits only)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MchId(String);

impl MchId {
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.is_empty() {
            return Err("MchId must not be empty".to_string());
        }
        if !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("MchId must contain only digits, got {}", id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Certificate serial number, for the merchant API certificate or the
/// platform certificate / public key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerialNo(String);

impl SerialNo {
    pub fn new(serial: impl Into<String>) -> Result<Self, String> {
        let serial = serial.into();
        if serial.is_empty() {
            return Err("SerialNo must not be empty".to_string());
        }
        // platform public key ids look like PUB_KEY_ID_0114...
        if !serial
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            return Err(format!("SerialNo contains invalid characters: {}", serial));
        }
        Ok(Self(serial))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mch_id_valid() {
        let id = MchId::new("1900000109").unwrap();
        assert_eq!(id.as_str(), "1900000109");
    }

    #[test]
    fn test_mch_id_empty() {
        assert!(MchId::new("").is_err());
    }

    #[test]
    fn test_mch_id_non_digit() {
        let result = MchId::new("19000x0109");
        assert!(result.unwrap_err().contains("only digits"));
    }

    #[test]
    fn test_serial_no_valid() {
        let serial = SerialNo::new("5157F09EFDC096DE15EBE81A47057A7232F1B8E1").unwrap();
        assert_eq!(serial.as_str(), "5157F09EFDC096DE15EBE81A47057A7232F1B8E1");
        assert!(SerialNo::new("PUB_KEY_ID_0114232012").is_ok());
    }

    #[test]
    fn test_serial_no_invalid() {
        assert!(SerialNo::new("").is_err());
        assert!(SerialNo::new("ABC DEF").is_err());
    }
}
