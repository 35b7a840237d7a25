#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd)]
pub enum FileMode {
    #[default]
    Regular,
    Executable,
}

/// Mode of a tree entry, as recorded in tree objects.
#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd)]
pub enum EntryMode {
    File(FileMode),
    Symlink,
    #[default]
    Directory,
}

impl EntryMode {
    pub fn as_str(&self) -> &str {
        match self {
            EntryMode::File(FileMode::Regular) => "100644",
            EntryMode::File(FileMode::Executable) => "100755",
            EntryMode::Symlink => "120000",
            EntryMode::Directory => "40000",
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::File(FileMode::Regular) => 0o100644,
            EntryMode::File(FileMode::Executable) => 0o100755,
            EntryMode::Symlink => 0o120000,
            EntryMode::Directory => 0o40000,
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, EntryMode::Directory)
    }

    pub fn from_octal_str(value: &str) -> anyhow::Result<Self> {
        match value {
            "100644" => Ok(EntryMode::File(FileMode::Regular)),
            "100755" => Ok(EntryMode::File(FileMode::Executable)),
            "120000" => Ok(EntryMode::Symlink),
            "40000" | "040000" => Ok(EntryMode::Directory),
            _ => Err(anyhow::anyhow!("Invalid entry mode: {value}")),
        }
    }
}

impl From<FileMode> for EntryMode {
    fn from(mode: FileMode) -> Self {
        EntryMode::File(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(EntryMode::File(FileMode::Regular))]
    #[case(EntryMode::File(FileMode::Executable))]
    #[case(EntryMode::Symlink)]
    #[case(EntryMode::Directory)]
    fn test_octal_string_matches_numeric_mode(#[case] mode: EntryMode) {
        pretty_assertions::assert_eq!(format!("{:o}", mode.as_u32()), mode.as_str());
        pretty_assertions::assert_eq!(EntryMode::from_octal_str(mode.as_str()).unwrap(), mode);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(EntryMode::from_octal_str("160000").is_err());
    }
}
