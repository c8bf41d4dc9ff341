use crate::models::error::StreamError;

/// Out-of-band control command for an active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Ask the transfer engine to terminate at the next chunk
    /// boundary.
    Stop,
    /// Set session volume through the driver side channel.
    Volume(u32),
}

impl SessionCommand {
    /// Parse the `-cmd=` token stream of a control invocation.
    ///
    /// Grammar: `-cmd=stop` or `-cmd=volume -value=N`. Stateless per
    /// invocation; anything unrecognized is `InvalidCommand`.
    pub fn parse<'a, I>(tokens: I) -> Result<Self, StreamError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut tokens = tokens.into_iter();
        let cmd = tokens
            .next()
            .and_then(|t| t.strip_prefix("-cmd="))
            .ok_or_else(|| StreamError::InvalidCommand("expected -cmd=".into()))?;

        match cmd {
            "stop" => Ok(Self::Stop),
            "volume" => {
                let value = tokens
                    .next()
                    .and_then(|t| t.strip_prefix("-value="))
                    .ok_or_else(|| StreamError::InvalidCommand("volume needs -value=".into()))?;
                let value = value
                    .parse()
                    .map_err(|_| StreamError::InvalidCommand(format!("bad volume value: {}", value)))?;
                Ok(Self::Volume(value))
            }
            other => Err(StreamError::InvalidCommand(format!(
                "unknown command: {}",
                other
            ))),
        }
    }
}
