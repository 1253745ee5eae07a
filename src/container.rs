use std::fmt;

use crate::error::{Error, Result};

/// Vulkan format of the texel data, as stored in the `vkFormat` header field.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VkFormat(pub u32);

impl VkFormat {
    pub const UNDEFINED: Self = Self(0);
    pub const R8G8B8A8_UNORM: Self = Self(37);
    pub const R8G8B8A8_SRGB: Self = Self(43);
    pub const BC7_UNORM_BLOCK: Self = Self(145);
    pub const ASTC_4X4_UNORM_BLOCK: Self = Self(157);

    /// Vulkan enum name of the format or `None` when it is not one of the commonly used ones.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub const fn name(self) -> Option<&'static str> {
        let name = match self.0 {
            0 => "VK_FORMAT_UNDEFINED",
            9 => "VK_FORMAT_R8_UNORM",
            10 => "VK_FORMAT_R8_SNORM",
            13 => "VK_FORMAT_R8_UINT",
            15 => "VK_FORMAT_R8_SRGB",
            16 => "VK_FORMAT_R8G8_UNORM",
            23 => "VK_FORMAT_R8G8B8_UNORM",
            29 => "VK_FORMAT_R8G8B8_SRGB",
            37 => "VK_FORMAT_R8G8B8A8_UNORM",
            38 => "VK_FORMAT_R8G8B8A8_SNORM",
            41 => "VK_FORMAT_R8G8B8A8_UINT",
            43 => "VK_FORMAT_R8G8B8A8_SRGB",
            44 => "VK_FORMAT_B8G8R8A8_UNORM",
            50 => "VK_FORMAT_B8G8R8A8_SRGB",
            64 => "VK_FORMAT_A2B10G10R10_UNORM_PACK32",
            70 => "VK_FORMAT_R16_UNORM",
            76 => "VK_FORMAT_R16_SFLOAT",
            83 => "VK_FORMAT_R16G16_SFLOAT",
            97 => "VK_FORMAT_R16G16B16A16_SFLOAT",
            100 => "VK_FORMAT_R32_SFLOAT",
            103 => "VK_FORMAT_R32G32_SFLOAT",
            106 => "VK_FORMAT_R32G32B32_SFLOAT",
            109 => "VK_FORMAT_R32G32B32A32_SFLOAT",
            122 => "VK_FORMAT_B10G11R11_UFLOAT_PACK32",
            123 => "VK_FORMAT_E5B9G9R9_UFLOAT_PACK32",
            124 => "VK_FORMAT_D16_UNORM",
            126 => "VK_FORMAT_D32_SFLOAT",
            131 => "VK_FORMAT_BC1_RGB_UNORM_BLOCK",
            132 => "VK_FORMAT_BC1_RGB_SRGB_BLOCK",
            133 => "VK_FORMAT_BC1_RGBA_UNORM_BLOCK",
            134 => "VK_FORMAT_BC1_RGBA_SRGB_BLOCK",
            135 => "VK_FORMAT_BC2_UNORM_BLOCK",
            136 => "VK_FORMAT_BC2_SRGB_BLOCK",
            137 => "VK_FORMAT_BC3_UNORM_BLOCK",
            138 => "VK_FORMAT_BC3_SRGB_BLOCK",
            139 => "VK_FORMAT_BC4_UNORM_BLOCK",
            140 => "VK_FORMAT_BC4_SNORM_BLOCK",
            141 => "VK_FORMAT_BC5_UNORM_BLOCK",
            142 => "VK_FORMAT_BC5_SNORM_BLOCK",
            143 => "VK_FORMAT_BC6H_UFLOAT_BLOCK",
            144 => "VK_FORMAT_BC6H_SFLOAT_BLOCK",
            145 => "VK_FORMAT_BC7_UNORM_BLOCK",
            146 => "VK_FORMAT_BC7_SRGB_BLOCK",
            147 => "VK_FORMAT_ETC2_R8G8B8_UNORM_BLOCK",
            148 => "VK_FORMAT_ETC2_R8G8B8_SRGB_BLOCK",
            149 => "VK_FORMAT_ETC2_R8G8B8A1_UNORM_BLOCK",
            150 => "VK_FORMAT_ETC2_R8G8B8A1_SRGB_BLOCK",
            151 => "VK_FORMAT_ETC2_R8G8B8A8_UNORM_BLOCK",
            152 => "VK_FORMAT_ETC2_R8G8B8A8_SRGB_BLOCK",
            153 => "VK_FORMAT_EAC_R11_UNORM_BLOCK",
            154 => "VK_FORMAT_EAC_R11_SNORM_BLOCK",
            155 => "VK_FORMAT_EAC_R11G11_UNORM_BLOCK",
            156 => "VK_FORMAT_EAC_R11G11_SNORM_BLOCK",
            157 => "VK_FORMAT_ASTC_4x4_UNORM_BLOCK",
            158 => "VK_FORMAT_ASTC_4x4_SRGB_BLOCK",
            159 => "VK_FORMAT_ASTC_5x4_UNORM_BLOCK",
            160 => "VK_FORMAT_ASTC_5x4_SRGB_BLOCK",
            161 => "VK_FORMAT_ASTC_5x5_UNORM_BLOCK",
            162 => "VK_FORMAT_ASTC_5x5_SRGB_BLOCK",
            163 => "VK_FORMAT_ASTC_6x5_UNORM_BLOCK",
            164 => "VK_FORMAT_ASTC_6x5_SRGB_BLOCK",
            165 => "VK_FORMAT_ASTC_6x6_UNORM_BLOCK",
            166 => "VK_FORMAT_ASTC_6x6_SRGB_BLOCK",
            167 => "VK_FORMAT_ASTC_8x5_UNORM_BLOCK",
            168 => "VK_FORMAT_ASTC_8x5_SRGB_BLOCK",
            169 => "VK_FORMAT_ASTC_8x6_UNORM_BLOCK",
            170 => "VK_FORMAT_ASTC_8x6_SRGB_BLOCK",
            171 => "VK_FORMAT_ASTC_8x8_UNORM_BLOCK",
            172 => "VK_FORMAT_ASTC_8x8_SRGB_BLOCK",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for VkFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "VK_FORMAT_{}", self.0),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupercompressionScheme {
    #[default]
    None,
    BasisLz,
    Zstandard,
    Zlib,
    Other(u32),
}

impl From<u32> for SupercompressionScheme {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::None,
            1 => Self::BasisLz,
            2 => Self::Zstandard,
            3 => Self::Zlib,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for SupercompressionScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::BasisLz => f.write_str("BasisLZ"),
            Self::Zstandard => f.write_str("Zstandard"),
            Self::Zlib => f.write_str("ZLIB"),
            Self::Other(value) => write!(f, "Vendor ({value})"),
        }
    }
}

/// Position of a block inside the container file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    pub byte_offset: u64,
    pub byte_length: u64,
}

impl ByteRange {
    #[must_use]
    pub const fn new(byte_offset: u64, byte_length: u64) -> Self {
        Self {
            byte_offset,
            byte_length,
        }
    }
}

/// One entry of the level index table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LevelIndex {
    pub byte_offset: u64,
    pub byte_length: u64,
    pub uncompressed_byte_length: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetadataValue {
    Text(String),
    Bytes(Vec<u8>),
}

impl MetadataValue {
    /// Interpret a raw key-value entry.
    ///
    /// KTX2 writers terminate string values with a NUL byte.
    /// Values which are valid UTF-8 after stripping it are treated as text.
    ///
    /// ```
    /// # use ktx2_tree::MetadataValue;
    /// assert_eq!(MetadataValue::from_bytes(b"rd\0"), MetadataValue::Text("rd".to_owned()));
    /// assert_eq!(MetadataValue::from_bytes(&[0xff, 0x00]), MetadataValue::Bytes(vec![0xff, 0x00]));
    /// ```
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let text = bytes.strip_suffix(&[0_u8]).unwrap_or(bytes);
        match std::str::from_utf8(text) {
            Ok(text) if !text.contains('\0') => Self::Text(text.to_owned()),
            _ => Self::Bytes(bytes.to_vec()),
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

/// Decoded payload of one (level, layer, face, depth) slot.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Image {
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub data: Vec<u8>,
}

impl Image {
    #[must_use]
    pub const fn new(pixel_width: u32, pixel_height: u32, data: Vec<u8>) -> Self {
        Self {
            pixel_width,
            pixel_height,
            data,
        }
    }
}

/// The fully parsed container as handed over by the parser.
///
/// Nothing in this crate reads files.
/// The `images` are the flattened payloads, level major, then layer, face and depth slice.
///
/// # Example
///
/// ```
/// # use ktx2_tree::{Container, VkFormat};
/// let container = Container::new(VkFormat::R8G8B8A8_SRGB)
///     .with_size(64, 64, 0)
///     .with_counts(0, 6, 1);
/// assert_eq!(container.face_count, 6);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Container {
    pub vk_format: VkFormat,
    pub type_size: u32,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub pixel_depth: u32,
    pub layer_count: u32,
    pub face_count: u32,
    pub level_count: u32,
    pub supercompression_scheme: SupercompressionScheme,
    pub dfd: ByteRange,
    pub kvd: ByteRange,
    pub sgd: ByteRange,
    pub levels: Vec<LevelIndex>,
    /// Key-value metadata in file order.
    pub key_values: Vec<(String, MetadataValue)>,
    pub images: Vec<Image>,
}

impl Container {
    #[must_use]
    pub fn new(vk_format: VkFormat) -> Self {
        Self {
            vk_format,
            type_size: 1,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_type_size(mut self, type_size: u32) -> Self {
        self.type_size = type_size;
        self
    }

    #[must_use]
    pub const fn with_size(mut self, pixel_width: u32, pixel_height: u32, pixel_depth: u32) -> Self {
        self.pixel_width = pixel_width;
        self.pixel_height = pixel_height;
        self.pixel_depth = pixel_depth;
        self
    }

    #[must_use]
    pub const fn with_counts(mut self, layer_count: u32, face_count: u32, level_count: u32) -> Self {
        self.layer_count = layer_count;
        self.face_count = face_count;
        self.level_count = level_count;
        self
    }

    #[must_use]
    pub const fn with_supercompression(mut self, scheme: SupercompressionScheme) -> Self {
        self.supercompression_scheme = scheme;
        self
    }

    #[must_use]
    pub const fn with_blocks(mut self, dfd: ByteRange, kvd: ByteRange, sgd: ByteRange) -> Self {
        self.dfd = dfd;
        self.kvd = kvd;
        self.sgd = sgd;
        self
    }

    #[must_use]
    pub fn with_levels(mut self, levels: Vec<LevelIndex>) -> Self {
        self.levels = levels;
        self
    }

    #[must_use]
    pub fn with_key_value<K>(mut self, key: K, value: MetadataValue) -> Self
    where
        K: Into<String>,
    {
        self.key_values.push((key.into(), value));
        self
    }

    #[must_use]
    pub fn with_images(mut self, images: Vec<Image>) -> Self {
        self.images = images;
        self
    }

    /// Get the payload at the flat image index.
    ///
    /// # Errors
    ///
    /// Errors when the container holds fewer images than the index requires.
    pub fn image(&self, index: usize) -> Result<&Image> {
        self.images.get(index).ok_or(Error::ImageOutOfRange {
            index,
            image_count: self.images.len(),
        })
    }
}

#[test]
fn vk_format_display_falls_back_to_number() {
    assert_eq!(VkFormat::R8G8B8A8_SRGB.to_string(), "VK_FORMAT_R8G8B8A8_SRGB");
    assert_eq!(VkFormat(1_000_066_000).to_string(), "VK_FORMAT_1000066000");
}

#[test]
fn supercompression_scheme_from_header_value() {
    assert_eq!(SupercompressionScheme::from(2), SupercompressionScheme::Zstandard);
    assert_eq!(SupercompressionScheme::from(1).to_string(), "BasisLZ");
    assert_eq!(SupercompressionScheme::from(42), SupercompressionScheme::Other(42));
}

#[test]
fn metadata_value_without_terminator_is_text() {
    let value = MetadataValue::from_bytes(b"KTX-Software v4");
    assert_eq!(value.to_string(), "KTX-Software v4");
}

#[test]
fn metadata_value_binary_shows_length() {
    let value = MetadataValue::from_bytes(&[1, 0, 2, 0]);
    assert_eq!(value.to_string(), "<4 bytes>");
}

#[test]
fn image_out_of_range_is_surfaced() {
    let container = Container::new(VkFormat::R8G8B8A8_UNORM).with_images(vec![Image::default()]);
    assert!(container.image(0).is_ok());
    assert_eq!(
        container.image(3),
        Err(Error::ImageOutOfRange {
            index: 3,
            image_count: 1
        })
    );
}
