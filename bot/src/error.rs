use strum_macros::Display;
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error(transparent)]
    Stats(#[from] reflexer::Error),

    #[error(transparent)]
    Snapshot(#[from] snapshot::Error),

    #[error(transparent)]
    Twitter(#[from] twitter::Error),
}

/// Coarse failure classes, each with its own process exit status.
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    Config,
    DataUnavailable,
    PriceUnavailable,
    MalformedStat,
    SnapshotFailed,
    UploadFailed,
    PublishFailed,
    Transport,
    Other,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Stats(e) => match e {
                reflexer::Error::DataUnavailable(_) => ErrorKind::DataUnavailable,
                reflexer::Error::PriceUnavailable(_) => ErrorKind::PriceUnavailable,
                reflexer::Error::MalformedStat { .. } => ErrorKind::MalformedStat,
                reflexer::Error::Request(_) => ErrorKind::Transport,
                reflexer::Error::Url(_) => ErrorKind::Config,
            },
            Error::Snapshot(_) => ErrorKind::SnapshotFailed,
            Error::Twitter(e) => match e {
                twitter::Error::UploadFailed(..) => ErrorKind::UploadFailed,
                twitter::Error::PublishFailed(..) => ErrorKind::PublishFailed,
                twitter::Error::Request(_) => ErrorKind::Transport,
                twitter::Error::Config(_) => ErrorKind::Config,
                twitter::Error::Timestamp(_)
                | twitter::Error::Signing(_)
                | twitter::Error::Deserialize(_) => ErrorKind::Other,
            },
        }
    }
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Other => 1,
            ErrorKind::Config => 2,
            ErrorKind::DataUnavailable => 3,
            ErrorKind::PriceUnavailable => 4,
            ErrorKind::MalformedStat => 5,
            ErrorKind::SnapshotFailed => 6,
            ErrorKind::UploadFailed => 7,
            ErrorKind::PublishFailed => 8,
            ErrorKind::Transport => 9,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use twitter::StatusCode;

    #[test]
    fn classifies_crate_errors() {
        let cases: [(Error, ErrorKind); 6] = [
            (reflexer::Error::DataUnavailable("No data".into()).into(), ErrorKind::DataUnavailable),
            (reflexer::Error::PriceUnavailable("n/a".into()).into(), ErrorKind::PriceUnavailable),
            (
                reflexer::Error::MalformedStat {
                    field: "uniswapPair.token1Price".into(),
                    value: "null".into(),
                }
                .into(),
                ErrorKind::MalformedStat,
            ),
            (snapshot::Error::NavigationTimeout("https://stats.reflexer.finance/".into()).into(), ErrorKind::SnapshotFailed),
            (twitter::Error::UploadFailed(StatusCode::BAD_REQUEST, String::new()).into(), ErrorKind::UploadFailed),
            (twitter::Error::Config("CONSUMER_KEY not found in environment".into()).into(), ErrorKind::Config),
        ];

        for (error, kind) in cases {
            assert_eq!(error.kind(), kind, "{error}");
        }
    }

    #[test]
    fn exit_codes_are_distinct_and_non_zero() {
        let kinds = [
            ErrorKind::Config,
            ErrorKind::DataUnavailable,
            ErrorKind::PriceUnavailable,
            ErrorKind::MalformedStat,
            ErrorKind::SnapshotFailed,
            ErrorKind::UploadFailed,
            ErrorKind::PublishFailed,
            ErrorKind::Transport,
            ErrorKind::Other,
        ];
        let codes: HashSet<u8> = kinds.iter().map(|k| k.exit_code()).collect();

        assert_eq!(codes.len(), kinds.len());
        assert!(!codes.contains(&0));
    }
}
