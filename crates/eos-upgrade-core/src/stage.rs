#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Prepare,
    UpdateChannels,
    Download,
    Install,
    CleanUp,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Prepare,
        Stage::UpdateChannels,
        Stage::Download,
        Stage::Install,
        Stage::CleanUp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prepare => "PREPARE",
            Self::UpdateChannels => "UPDATE_CHANNELS",
            Self::Download => "DOWNLOAD",
            Self::Install => "INSTALL",
            Self::CleanUp => "CLEAN_UP",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "PREPARE" => Some(Self::Prepare),
            "UPDATE_CHANNELS" => Some(Self::UpdateChannels),
            "DOWNLOAD" => Some(Self::Download),
            "INSTALL" => Some(Self::Install),
            "CLEAN_UP" => Some(Self::CleanUp),
            _ => None,
        }
    }

    pub fn checkpoints(self) -> &'static [u8] {
        match self {
            Self::Prepare => &[0, 20, 40, 60, 80, 100],
            Self::UpdateChannels => &[0, 100],
            Self::Download => &[0, 50, 100],
            Self::Install => &[0, 100],
            Self::CleanUp => &[0, 33, 66, 100],
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
