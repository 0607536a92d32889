/// Credential pool with a forward-only cursor
///
/// The pool is shared across a whole crawl run. The cursor marks the
/// credential the next expansion starts from; it only ever moves forward and
/// never wraps, so once the last credential is exhausted the run is over.
#[derive(Debug, Clone, Default)]
pub struct CredentialPool {
    credentials: Vec<String>,
    cursor: usize,
}

impl CredentialPool {
    /// Creates a pool with the cursor on the first credential
    pub fn new(credentials: Vec<String>) -> Self {
        Self {
            credentials,
            cursor: 0,
        }
    }

    /// All credentials, in rotation order
    pub fn credentials(&self) -> &[String] {
        &self.credentials
    }

    /// Index of the active credential
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The active credential, if the pool is non-empty
    pub fn current(&self) -> Option<&str> {
        self.credentials.get(self.cursor).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Moves the cursor to `index`
    ///
    /// Backward moves and out-of-range indices are ignored. Returns the
    /// previous cursor when the cursor actually moved.
    pub fn advance_to(&mut self, index: usize) -> Option<usize> {
        if index > self.cursor && index < self.credentials.len() {
            let previous = self.cursor;
            self.cursor = index;
            Some(previous)
        } else {
            None
        }
    }
}
