// FFI functions are inherently unsafe — callers must ensure pointer validity.
// Safety contracts are documented per-function in the public API comments.
#![allow(clippy::missing_safety_doc)]

//! kagome-ffi: the stable C ABI consumed by the host mail filter.
//!
//! Memory management rules:
//! - `kagome_init` installs a process-wide tokenizer; `kagome_deinit` drops it.
//! - `word.original.begin` always points into the caller's text buffer and
//!   is never freed by this library.
//! - `word.unicode`, `word.normalized`, and `word.stemmed` are owned by the
//!   core and released by `kagome_cleanup_result`, which is idempotent.
//! - All input text is UTF-8 with an explicit byte length; invalid byte
//!   sequences are skipped and never spanned by a token.

use std::ffi::{c_char, c_int, c_uint, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;
use std::slice;
use std::sync::{Arc, Mutex, OnceLock};

use kagome::{locate_system_dict, script, Dict, Tokenizer};

// ── Host word-record layout (bit-exact) ─────────────────────────

/// Byte-addressed text fragment.
#[repr(C)]
pub struct Ftok {
    pub len: usize,
    pub begin: *const c_char,
}

/// Code-point-addressed text fragment.
#[repr(C)]
pub struct FtokUnicode {
    pub len: usize,
    pub begin: *const u32,
}

/// One tokenized word.
#[repr(C)]
pub struct Word {
    pub original: Ftok,
    pub unicode: FtokUnicode,
    pub normalized: Ftok,
    pub stemmed: Ftok,
    pub flags: c_uint,
}

/// Growable word array, host `kvec` compatible.
#[repr(C)]
pub struct Words {
    pub n: usize,
    pub m: usize,
    pub a: *mut Word,
}

pub const WORD_FLAG_TEXT: c_uint = 1 << 0;
pub const WORD_FLAG_META: c_uint = 1 << 1;
pub const WORD_FLAG_LUA_META: c_uint = 1 << 2;
pub const WORD_FLAG_EXCEPTION: c_uint = 1 << 3;
pub const WORD_FLAG_HEADER: c_uint = 1 << 4;
pub const WORD_FLAG_UNIGRAM: c_uint = 1 << 5;
pub const WORD_FLAG_UTF: c_uint = 1 << 6;
pub const WORD_FLAG_NORMALISED: c_uint = 1 << 7;
pub const WORD_FLAG_STEMMED: c_uint = 1 << 8;
pub const WORD_FLAG_BROKEN_UNICODE: c_uint = 1 << 9;
pub const WORD_FLAG_STOP_WORD: c_uint = 1 << 10;
pub const WORD_FLAG_SKIPPED: c_uint = 1 << 11;
pub const WORD_FLAG_INVISIBLE_SPACES: c_uint = 1 << 12;
pub const WORD_FLAG_EMOJI: c_uint = 1 << 13;

const MIN_CONFIDENCE: f64 = 0.3;

fn tokenizer_slot() -> &'static Mutex<Option<Tokenizer>> {
    static SLOT: OnceLock<Mutex<Option<Tokenizer>>> = OnceLock::new();
    SLOT.get_or_init(|| Mutex::new(None))
}

fn write_err(err_buf: *mut c_char, err_buf_len: usize, msg: &str) {
    if err_buf.is_null() || err_buf_len == 0 {
        return;
    }
    let bytes = msg.as_bytes();
    // Truncation is explicit: whatever fits, then a NUL.
    let n = bytes.len().min(err_buf_len - 1);
    unsafe {
        ptr::copy_nonoverlapping(bytes.as_ptr(), err_buf.cast::<u8>(), n);
        *err_buf.add(n) = 0;
    }
}

// ── Lifecycle ───────────────────────────────────────────────────

/// Initializes the process-wide tokenizer.
///
/// The configuration object is accepted for ABI compatibility and
/// currently unused; dictionary discovery follows `KAGOME_DICT_PATH` and
/// the conventional path list. Returns 0 on success (including fallback
/// operation, which is reported as a warning through `err_buf`), negative
/// on failure. A repeated init replaces the stored tokenizer.
#[no_mangle]
pub unsafe extern "C" fn kagome_init(
    _config: *const c_void,
    err_buf: *mut c_char,
    err_buf_len: usize,
) -> c_int {
    let outcome = catch_unwind(|| {
        let dict = match locate_system_dict() {
            Some(path) => match Dict::from_path(&path) {
                Ok((dict, report)) => {
                    log::info!("loaded dictionary from {}", path.display());
                    for note in report.notes() {
                        log::debug!("{note}");
                    }
                    dict
                }
                Err(e) => {
                    write_err(
                        err_buf,
                        err_buf_len,
                        &format!(
                            "Warning: failed to load {}: {e}; using fallback dictionary.",
                            path.display()
                        ),
                    );
                    Dict::fallback()
                }
            },
            None => {
                write_err(
                    err_buf,
                    err_buf_len,
                    "Warning: no dictionary found. Using fallback dictionary; \
                     place ipa.dict next to the library for full functionality.",
                );
                Dict::fallback()
            }
        };
        Tokenizer::new(Arc::new(dict))
    });

    match outcome {
        Ok(tokenizer) => {
            let mut slot = match tokenizer_slot().lock() {
                Ok(slot) => slot,
                Err(poisoned) => poisoned.into_inner(),
            };
            if slot.is_some() {
                log::warn!("kagome_init called twice; replacing the tokenizer");
            }
            *slot = Some(tokenizer);
            0
        }
        Err(_) => {
            write_err(err_buf, err_buf_len, "panic during kagome_init");
            -1
        }
    }
}

/// Drops the process-wide tokenizer.
#[no_mangle]
pub extern "C" fn kagome_deinit() {
    let mut slot = match tokenizer_slot().lock() {
        Ok(slot) => slot,
        Err(poisoned) => poisoned.into_inner(),
    };
    *slot = None;
}

// ── Language detection ──────────────────────────────────────────

/// Scores how confidently the text reads as Japanese.
///
/// Returns -1.0 when no Japanese-script code point is present, else a
/// value in [0.3, 0.95]. Invalid byte sequences count toward the total
/// only.
#[no_mangle]
pub unsafe extern "C" fn kagome_detect_language(text: *const c_char, len: usize) -> f64 {
    if text.is_null() || len == 0 {
        return -1.0;
    }
    let bytes = unsafe { slice::from_raw_parts(text.cast::<u8>(), len) };

    let mut total = 0usize;
    let mut japanese = 0usize;
    for chunk in Utf8Chunks::new(bytes) {
        match chunk {
            Ok((_, s)) => {
                for c in s.chars() {
                    total += 1;
                    if script::is_japanese(c) {
                        japanese += 1;
                    }
                }
            }
            Err(skipped) => total += skipped,
        }
    }
    script::confidence_from_counts(japanese, total)
}

// ── Tokenization ────────────────────────────────────────────────

/// Tokenizes UTF-8 text into host word records.
///
/// Every `original` fragment points into the caller's buffer. Returns 0 on
/// success (possibly with zero tokens), negative on failure. The result
/// must be released with `kagome_cleanup_result`.
#[no_mangle]
pub unsafe extern "C" fn kagome_tokenize(
    text: *const c_char,
    len: usize,
    result: *mut Words,
) -> c_int {
    if text.is_null() || len == 0 || result.is_null() {
        return -1;
    }
    let tokenizer = {
        let slot = match tokenizer_slot().lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        match slot.as_ref() {
            Some(tokenizer) => tokenizer.clone(),
            None => return -1,
        }
    };

    let out = unsafe { &mut *result };
    out.n = 0;
    out.m = 0;
    out.a = ptr::null_mut();

    let bytes = unsafe { slice::from_raw_parts(text.cast::<u8>(), len) };
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        tokenize_into_words(&tokenizer, text, bytes)
    }));
    match outcome {
        Ok(words) => {
            if !words.is_empty() {
                let mut words = words;
                out.n = words.len();
                out.m = words.capacity();
                out.a = words.as_mut_ptr();
                std::mem::forget(words);
            }
            0
        }
        Err(_) => -1,
    }
}

fn tokenize_into_words(tokenizer: &Tokenizer, text: *const c_char, bytes: &[u8]) -> Vec<Word> {
    let mut worker = tokenizer.new_worker();
    let mut words = Vec::new();

    // Invalid sequences split the input; no token may span them.
    for chunk in Utf8Chunks::new(bytes) {
        match chunk {
            Ok((offset, s)) => {
                worker.reset_sentence(s);
                worker.tokenize();
                for token in worker.token_iter() {
                    let surface = token.surface();
                    if surface.is_empty() {
                        continue;
                    }
                    let pos = offset + token.position();
                    // Never fabricate a pointer outside the caller's buffer.
                    if pos + surface.len() > bytes.len()
                        || &bytes[pos..pos + surface.len()] != surface.as_bytes()
                    {
                        continue;
                    }

                    let mut flags = WORD_FLAG_TEXT | WORD_FLAG_UTF | WORD_FLAG_NORMALISED;
                    let pos_tags = token.pos();
                    let primary = pos_tags.first().map(String::as_str).unwrap_or("");
                    let is_symbol = primary == "記号";
                    if is_symbol {
                        flags |= WORD_FLAG_EXCEPTION;
                    }
                    if primary == "助詞" || primary == "助動詞" {
                        flags |= WORD_FLAG_STOP_WORD;
                    }

                    let unicode = if is_symbol {
                        FtokUnicode {
                            len: 0,
                            begin: ptr::null(),
                        }
                    } else {
                        alloc_unicode(surface)
                    };

                    let base_form = token.base_form();
                    let normalized = if base_form.is_empty() || base_form == "*" {
                        surface
                    } else {
                        base_form.as_str()
                    };

                    words.push(Word {
                        original: Ftok {
                            len: surface.len(),
                            begin: unsafe { text.add(pos) },
                        },
                        unicode,
                        normalized: alloc_ftok(normalized),
                        stemmed: alloc_ftok(normalized),
                        flags,
                    });
                }
            }
            Err(_) => {}
        }
    }
    words
}

fn alloc_ftok(s: &str) -> Ftok {
    let boxed: Box<[u8]> = s.as_bytes().to_vec().into_boxed_slice();
    let len = boxed.len();
    Ftok {
        len,
        begin: Box::into_raw(boxed).cast::<c_char>(),
    }
}

fn alloc_unicode(s: &str) -> FtokUnicode {
    let boxed: Box<[u32]> = s.chars().map(u32::from).collect::<Vec<_>>().into_boxed_slice();
    let len = boxed.len();
    FtokUnicode {
        len,
        begin: Box::into_raw(boxed).cast::<u32>(),
    }
}

unsafe fn free_ftok(ftok: &mut Ftok) {
    if !ftok.begin.is_null() && ftok.len > 0 {
        let slice = ptr::slice_from_raw_parts_mut(ftok.begin.cast_mut().cast::<u8>(), ftok.len);
        drop(unsafe { Box::from_raw(slice) });
    }
    ftok.begin = ptr::null();
    ftok.len = 0;
}

/// Releases a tokenization result. Idempotent; never frees `original`.
#[no_mangle]
pub unsafe extern "C" fn kagome_cleanup_result(result: *mut Words) {
    if result.is_null() {
        return;
    }
    let out = unsafe { &mut *result };
    if out.a.is_null() {
        out.n = 0;
        out.m = 0;
        return;
    }

    let words = unsafe { Vec::from_raw_parts(out.a, out.n, out.m) };
    for mut word in words {
        // original.begin points into the caller's buffer; leave it alone.
        if !word.unicode.begin.is_null() && word.unicode.len > 0 {
            let slice = ptr::slice_from_raw_parts_mut(
                word.unicode.begin.cast_mut(),
                word.unicode.len,
            );
            drop(unsafe { Box::from_raw(slice) });
        }
        unsafe {
            free_ftok(&mut word.normalized);
            free_ftok(&mut word.stemmed);
        }
    }
    out.a = ptr::null_mut();
    out.n = 0;
    out.m = 0;
}

// ── Host hints ──────────────────────────────────────────────────

/// Returns the language this tokenizer handles.
#[no_mangle]
pub extern "C" fn kagome_get_language_hint() -> *const c_char {
    b"ja\0".as_ptr().cast::<c_char>()
}

/// Returns the minimum confidence for Japanese detection.
#[no_mangle]
pub extern "C" fn kagome_get_min_confidence() -> f64 {
    MIN_CONFIDENCE
}

// ── UTF-8 chunking ──────────────────────────────────────────────

/// Iterator over maximal valid UTF-8 chunks, reporting the byte count of
/// each skipped invalid run.
struct Utf8Chunks<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Utf8Chunks<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }
}

impl<'a> Iterator for Utf8Chunks<'a> {
    /// `Ok((byte_offset, chunk))` for a valid chunk, `Err(skipped_bytes)`
    /// for an invalid run.
    type Item = Result<(usize, &'a str), usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.bytes.len() {
            return None;
        }
        let rest = &self.bytes[self.offset..];
        match std::str::from_utf8(rest) {
            Ok(s) => {
                let item = Ok((self.offset, s));
                self.offset = self.bytes.len();
                Some(item)
            }
            Err(e) => {
                let valid = e.valid_up_to();
                if valid > 0 {
                    let s = unsafe { std::str::from_utf8_unchecked(&rest[..valid]) };
                    let item = Ok((self.offset, s));
                    self.offset += valid;
                    Some(item)
                } else {
                    let skip = e.error_len().unwrap_or(rest.len());
                    self.offset += skip;
                    Some(Err(skip))
                }
            }
        }
    }
}
