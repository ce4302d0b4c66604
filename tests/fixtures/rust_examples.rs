/**
 * @code {struct} BufferPool
 * @codeName BufferPool
 * @codeGroup Memory
 * @codeType struct
 * @codeLang rust
 * @codePlatform Server
 * @codeGeneric {T: Send + Sync} Buffer element type that is thread-safe
 * @codeDescription Thread-safe buffer pool for efficient memory management.
 * @codeVersion 1.0.0
 * @codeAccess public
 *
 * @codeExample Creating a BufferPool
 * let pool: BufferPool<Vec<u8>> = BufferPool::new(100);
 *
 * let buffer = pool.acquire().await?;
 * buffer.extend_from_slice(&data);
 * pool.release(buffer);
 */
struct BufferPool<T> {
    inner: Vec<T>,
}

/**
 * @code {method} acquire
 * @codeName acquire
 * @codeGroup Memory
 * @codeType method
 * @codeLang rust
 * @codePlatform Server
 * @codeAsync true
 * @codeSignature pub async fn acquire(&self) -> Result<T, PoolError>
 * @codeDescription Acquires a buffer from the pool, waiting if none available.
 * @codeReturn {Result<T, PoolError>} A buffer or error if pool is exhausted
 * @codeThrows {PoolError::Exhausted} When pool is empty and timeout reached
 * @codeThrows {PoolError::Poisoned} When pool mutex is poisoned
 * @codeVersion 1.0.0
 * @codeAccess public
 *
 * @codeExample Acquiring a Buffer
 * let buffer = pool.acquire().await?;
 * // Use buffer...
 * pool.release(buffer);
 */

/**
 * @code {interface} Serializable
 * @codeName Serializable
 * @codeGroup Traits
 * @codeType interface
 * @codeLang rust
 * @codePlatform Server
 * @codeDescription Trait for types that can be serialized to bytes.
 * @codeVersion 1.0.0
 *
 * @codeExample Implementing Serializable
 * impl Serializable for User {
 *     fn serialize(&self) -> Result<Vec<u8>, SerializeError> {
 *         Ok(serde_json::to_vec(self)?)
 *     }
 *
 *     fn deserialize(data: &[u8]) -> Result<Self, SerializeError> {
 *         Ok(serde_json::from_slice(data)?)
 *     }
 * }
 */
trait Serializable {
    fn serialize(&self) -> Vec<u8>;
}

/**
 * @code {function} parse_config
 * @codeName parse_config
 * @codeGroup Utils
 * @codeType function
 * @codeLang rust
 * @codePlatform Server
 * @codeSignature pub fn parse_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError>
 * @codeGeneric {P: AsRef<Path>} Path type that can be converted to Path
 * @codeDescription Parses a configuration file from the given path.
 * @codeParam {P} path Path to the configuration file
 * @codeReturn {Result<Config, ConfigError>} Parsed config or error
 * @codeThrows {ConfigError::NotFound} When file doesn't exist
 * @codeThrows {ConfigError::ParseError} When file format is invalid
 * @codeVersion 1.0.0
 * @codeAccess public
 *
 * @codeExample Parsing Configuration
 * let config = parse_config("./config.toml")?;
 * println!("Server port: {}", config.server.port);
 */
fn parse_config() {}

/**
 * @code {enum} ConnectionState
 * @codeName ConnectionState
 * @codeGroup Types
 * @codeType enum
 * @codeLang rust
 * @codePlatform Server
 * @codeDescription Represents the state of a network connection.
 * @codeVersion 1.0.0
 *
 * @codeExample Pattern Matching on ConnectionState
 * match connection.state() {
 *     ConnectionState::Connected => {
 *         println!("Ready to send data");
 *     }
 *     ConnectionState::Connecting { attempt } => {
 *         println!("Connecting... attempt {}", attempt);
 *     }
 *     ConnectionState::Disconnected { reason } => {
 *         println!("Disconnected: {}", reason);
 *     }
 * }
 */
enum ConnectionState {
    Connected,
    Connecting,
    Disconnected,
}
