use std::fmt;
use std::io::{self, Write};

#[derive(Debug)]
pub enum CompressionError {
    Io(std::io::Error),
    #[cfg(feature = "lzma-compression")]
    LZMA(lzma::LzmaError),
}
impl std::error::Error for CompressionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompressionError::Io(err) => Some(err),
            #[cfg(feature = "lzma-compression")]
            CompressionError::LZMA(err) => Some(err),
        }
    }
}
impl fmt::Display for CompressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(_) => write!(f, "i/o error"),
            #[cfg(feature = "lzma-compression")]
            Self::LZMA(_) => write!(f, "LZMA error"),
        }
    }
}
impl From<std::io::Error> for CompressionError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
#[cfg(feature = "lzma-compression")]
impl From<lzma::LzmaError> for CompressionError {
    fn from(e: lzma::LzmaError) -> Self {
        Self::LZMA(e)
    }
}

#[derive(Debug)]
pub struct CompressionLevelOutOfRangeError(CompressionAlgorithm);
impl std::error::Error for CompressionLevelOutOfRangeError {}
impl fmt::Display for CompressionLevelOutOfRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} compression level out of range (valid range is 1-{})",
            self.0,
            self.0.max_level()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionAlgorithm {
    #[cfg(feature = "lzma-compression")]
    Lzma,
    #[cfg(feature = "zstd-compression")]
    Zstd,
    Brotli,
}

impl CompressionAlgorithm {
    /// Get the compression algorithm's max level.
    pub fn max_level(self) -> u32 {
        match self {
            #[cfg(feature = "lzma-compression")]
            CompressionAlgorithm::Lzma => 9,
            #[cfg(feature = "zstd-compression")]
            CompressionAlgorithm::Zstd => 22,
            CompressionAlgorithm::Brotli => 11,
        }
    }
}

impl fmt::Display for CompressionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let algorithm_name = match self {
            #[cfg(feature = "lzma-compression")]
            CompressionAlgorithm::Lzma => "LZMA",
            #[cfg(feature = "zstd-compression")]
            CompressionAlgorithm::Zstd => "zstd",
            CompressionAlgorithm::Brotli => "Brotli",
        };
        write!(f, "{}", algorithm_name)
    }
}

/// Compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compression {
    pub(crate) algorithm: CompressionAlgorithm,
    pub(crate) level: u32,
}

impl Compression {
    /// Create a new compression of given algorithm and level.
    pub fn try_new(
        algorithm: CompressionAlgorithm,
        level: u32,
    ) -> Result<Compression, CompressionLevelOutOfRangeError> {
        if level < 1 || level > algorithm.max_level() {
            return Err(CompressionLevelOutOfRangeError(algorithm));
        }
        Ok(Compression { algorithm, level })
    }
    /// Create a new brotli compression of given level.
    pub fn brotli(level: u32) -> Result<Compression, CompressionLevelOutOfRangeError> {
        Self::try_new(CompressionAlgorithm::Brotli, level)
    }
    #[cfg(feature = "lzma-compression")]
    /// Create a new lzma compression of given level.
    pub fn lzma(level: u32) -> Result<Compression, CompressionLevelOutOfRangeError> {
        Self::try_new(CompressionAlgorithm::Lzma, level)
    }
    #[cfg(feature = "zstd-compression")]
    /// Create a new zstd compression of given level.
    pub fn zstd(level: u32) -> Result<Compression, CompressionLevelOutOfRangeError> {
        Self::try_new(CompressionAlgorithm::Zstd, level)
    }
    pub fn algorithm(&self) -> CompressionAlgorithm {
        self.algorithm
    }
    pub fn level(&self) -> u32 {
        self.level
    }
    /// Wrap the given output in a streaming encoder of set compression.
    pub(crate) fn encoder<W: Write>(self, output: W) -> Result<Encoder<W>, CompressionError> {
        Ok(match self.algorithm {
            #[cfg(feature = "lzma-compression")]
            CompressionAlgorithm::Lzma => {
                Encoder::Lzma(lzma::LzmaWriter::new_compressor(output, self.level)?)
            }
            #[cfg(feature = "zstd-compression")]
            CompressionAlgorithm::Zstd => Encoder::Zstd(zstd::stream::write::Encoder::new(
                output,
                self.level as i32,
            )?),
            CompressionAlgorithm::Brotli => {
                use brotli::enc::backward_references::BrotliEncoderParams;
                let params = BrotliEncoderParams {
                    quality: self.level as i32,
                    magic_number: false,
                    ..Default::default()
                };
                Encoder::Brotli(Box::new(brotli::CompressorWriter::with_params(
                    output,
                    BROTLI_BUFFER_SIZE,
                    &params,
                )))
            }
        })
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (level {})", self.algorithm, self.level)
    }
}

const BROTLI_BUFFER_SIZE: usize = 64 * 1024;

/// A streaming encoder writing to some output.
///
/// Encoders may keep data buffered until finished, the output is only
/// complete after `finish` has returned.
pub(crate) enum Encoder<W: Write> {
    /// No compression, data is passed straight through.
    Passthrough(W),
    Brotli(Box<brotli::CompressorWriter<W>>),
    #[cfg(feature = "zstd-compression")]
    Zstd(zstd::stream::write::Encoder<'static, W>),
    #[cfg(feature = "lzma-compression")]
    Lzma(lzma::LzmaWriter<W>),
}

impl<W: Write> Encoder<W> {
    pub(crate) fn new(
        compression: Option<Compression>,
        output: W,
    ) -> Result<Self, CompressionError> {
        match compression {
            Some(compression) => compression.encoder(output),
            None => Ok(Self::Passthrough(output)),
        }
    }
    pub(crate) fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Self::Passthrough(w) => w.write_all(buf),
            Self::Brotli(w) => w.write_all(buf),
            #[cfg(feature = "zstd-compression")]
            Self::Zstd(w) => w.write_all(buf),
            #[cfg(feature = "lzma-compression")]
            Self::Lzma(w) => w.write_all(buf),
        }
    }
    /// Flush and close the encoder, giving back the output.
    pub(crate) fn finish(self) -> Result<W, CompressionError> {
        Ok(match self {
            Self::Passthrough(mut w) => {
                w.flush()?;
                w
            }
            Self::Brotli(w) => (*w).into_inner(),
            #[cfg(feature = "zstd-compression")]
            Self::Zstd(w) => w.finish()?,
            #[cfg(feature = "lzma-compression")]
            Self::Lzma(w) => w.finish()?,
        })
    }
}
