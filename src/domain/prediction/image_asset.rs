//! Prediction Context - ImageAsset
//!
//! 待识别图片的句柄：字节 + 文件名 + MIME 类型

use bytes::Bytes;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// 默认 MIME 类型，预测服务只接受 JPEG 兼容数据
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// 无法识别的图片来源
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown image source '{0}' (expected library or camera)")]
pub struct UnknownImageSource(pub String);

/// 图片来源
///
/// 只影响默认文件名，客户端不关心字节是怎么拿到的
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageSource {
    /// 从相册/磁盘选取
    #[default]
    Library,
    /// 相机实时拍摄
    Camera,
}

impl ImageSource {
    pub fn default_filename(&self) -> &'static str {
        match self {
            ImageSource::Library => "image.jpg",
            ImageSource::Camera => "photo.jpg",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSource::Library => "library",
            ImageSource::Camera => "camera",
        }
    }
}

impl FromStr for ImageSource {
    type Err = UnknownImageSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "library" | "gallery" => Ok(ImageSource::Library),
            "camera" => Ok(ImageSource::Camera),
            _ => Err(UnknownImageSource(s.to_string())),
        }
    }
}

/// 图片资源
///
/// 不变量:
/// - 创建后不可变，选取新图片时整体替换
/// - 字节内容不做校验，是否为合法 JPEG 由服务端判断
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    bytes: Bytes,
    filename: String,
    content_type: String,
}

impl ImageAsset {
    pub fn new(
        bytes: impl Into<Bytes>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
            content_type: content_type.into(),
        }
    }

    /// 按来源使用默认文件名和 `image/jpeg`
    pub fn from_source(bytes: impl Into<Bytes>, source: ImageSource) -> Self {
        Self::new(bytes, source.default_filename(), JPEG_CONTENT_TYPE)
    }

    /// 从磁盘读取图片
    pub async fn load(path: impl AsRef<Path>, source: ImageSource) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;

        tracing::debug!(
            path = %path.display(),
            size = data.len(),
            source = source.as_str(),
            "Image loaded"
        );

        Ok(Self::from_source(data, source))
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_filename_per_source() {
        let picked = ImageAsset::from_source(vec![0xFF, 0xD8], ImageSource::Library);
        assert_eq!(picked.filename(), "image.jpg");
        assert_eq!(picked.content_type(), "image/jpeg");

        let captured = ImageAsset::from_source(vec![0xFF, 0xD8], ImageSource::Camera);
        assert_eq!(captured.filename(), "photo.jpg");
        assert_eq!(captured.len(), 2);
        assert!(!captured.is_empty());
    }

    #[test]
    fn test_empty_bytes_accepted() {
        let asset = ImageAsset::from_source(Vec::new(), ImageSource::Library);
        assert!(asset.is_empty());
        assert_eq!(asset.len(), 0);
    }

    #[test]
    fn test_source_from_str() {
        assert_eq!("Camera".parse::<ImageSource>(), Ok(ImageSource::Camera));
        assert_eq!("gallery".parse::<ImageSource>(), Ok(ImageSource::Library));
        assert_eq!(
            "scanner".parse::<ImageSource>(),
            Err(UnknownImageSource("scanner".to_string()))
        );
    }

    #[tokio::test]
    async fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

        let asset = ImageAsset::load(file.path(), ImageSource::Camera)
            .await
            .unwrap();
        assert_eq!(asset.bytes().as_ref(), &[0xFF, 0xD8, 0xFF, 0xE0]);
        assert_eq!(asset.filename(), "photo.jpg");
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = ImageAsset::load("/nonexistent/peak.jpg", ImageSource::Library).await;
        assert!(result.is_err());
    }
}
