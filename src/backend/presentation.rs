// Presentation mode chosen by the host before adapter selection

use ash::vk;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum PresentationMode {
    #[serde(rename = "immediate")]
    Immediate,
    #[default]
    #[serde(rename = "vsync")]
    VSyncDoubleBuffering,
    #[serde(rename = "relaxed_vsync")]
    RelaxedVSyncDoubleBuffering,
    #[serde(rename = "triple_buffering")]
    VSyncTripleBuffering,
}

impl PresentationMode {
    pub const ALL: [PresentationMode; 4] = [
        PresentationMode::Immediate,
        PresentationMode::VSyncDoubleBuffering,
        PresentationMode::RelaxedVSyncDoubleBuffering,
        PresentationMode::VSyncTripleBuffering,
    ];

    /// Native present mode a device must support for this setting.
    pub fn present_mode(self) -> vk::PresentModeKHR {
        match self {
            PresentationMode::Immediate => vk::PresentModeKHR::IMMEDIATE,
            PresentationMode::VSyncDoubleBuffering => vk::PresentModeKHR::FIFO,
            PresentationMode::RelaxedVSyncDoubleBuffering => vk::PresentModeKHR::FIFO_RELAXED,
            PresentationMode::VSyncTripleBuffering => vk::PresentModeKHR::MAILBOX,
        }
    }

    /// Swapchain image count requested before clamping to surface bounds.
    pub fn requested_image_count(self) -> u32 {
        match self {
            PresentationMode::VSyncTripleBuffering => 3,
            _ => 2,
        }
    }

    /// Next mode in declaration order, wrapping around.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|&m| m == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triple_buffering_requests_three_images() {
        assert_eq!(PresentationMode::VSyncTripleBuffering.requested_image_count(), 3);
        for mode in [
            PresentationMode::Immediate,
            PresentationMode::VSyncDoubleBuffering,
            PresentationMode::RelaxedVSyncDoubleBuffering,
        ] {
            assert_eq!(mode.requested_image_count(), 2, "{mode:?}");
        }
    }

    #[test]
    fn native_mode_mapping() {
        assert_eq!(PresentationMode::Immediate.present_mode(), vk::PresentModeKHR::IMMEDIATE);
        assert_eq!(PresentationMode::VSyncDoubleBuffering.present_mode(), vk::PresentModeKHR::FIFO);
        assert_eq!(
            PresentationMode::RelaxedVSyncDoubleBuffering.present_mode(),
            vk::PresentModeKHR::FIFO_RELAXED
        );
        assert_eq!(PresentationMode::VSyncTripleBuffering.present_mode(), vk::PresentModeKHR::MAILBOX);
    }

    #[test]
    fn next_cycles_through_every_mode() {
        let mut mode = PresentationMode::Immediate;
        for expected in PresentationMode::ALL.iter().skip(1) {
            mode = mode.next();
            assert_eq!(mode, *expected);
        }
        assert_eq!(mode.next(), PresentationMode::Immediate);
    }

    #[test]
    fn deserializes_config_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: PresentationMode,
        }
        let parsed: Wrapper = toml::from_str("mode = \"triple_buffering\"").unwrap();
        assert_eq!(parsed.mode, PresentationMode::VSyncTripleBuffering);
    }
}
