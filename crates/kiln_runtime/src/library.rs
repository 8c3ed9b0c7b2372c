//! Loaded libraries and their entry points.

use std::mem::ManuallyDrop;
use std::os::raw::c_long;
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};

use crate::buffer::{Buffer, BufferMut};
use crate::error::RuntimeError;

/// The elementwise add every built library exports.
pub const ELEMENTWISE_ENTRY: &str = "test_add";

/// The zero-argument entry point that evaluates the library's expression tree.
pub const EXPRESSION_TREE_ENTRY: &str = "native_expression_tree";

type ElementwiseFn = unsafe extern "C" fn(*const f32, *const f32, *mut f32, c_long);
type EntryFn = unsafe extern "C" fn();

/// A shared library loaded into this process.
///
/// Loading runs the library's initializers and calling an entry point runs
/// arbitrary native code, so only libraries produced by a kiln build should be
/// loaded. There is no unload: dropping the value releases the handle but
/// the code stays mapped until the process exits, so function pointers taken
/// from it remain valid. Every [`ElementwiseOp`] borrows from it.
#[derive(Debug)]
pub struct NativeLibrary {
    path: PathBuf,
    lib: ManuallyDrop<Library>,
}

impl NativeLibrary {
    /// Loads the shared library at `path`.
    ///
    /// An empty or missing path is an argument error; a file the dynamic
    /// loader rejects is a load error.
    pub fn load(path: &Path) -> Result<Self, RuntimeError> {
        if path.as_os_str().is_empty() {
            return Err(RuntimeError::Argument("no library path given".to_string()));
        }
        if !path.is_file() {
            return Err(RuntimeError::Argument(format!(
                "library '{}' not found",
                path.display()
            )));
        }

        let lib = unsafe { Library::new(path) }.map_err(|source| RuntimeError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("loaded {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            lib: ManuallyDrop::new(lib),
        })
    }

    /// The path the library was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the library exports `name`.
    pub fn has_symbol(&self, name: &str) -> bool {
        unsafe { self.lib.get::<*const ()>(name.as_bytes()) }.is_ok()
    }

    /// Looks up an elementwise entry point with the signature
    /// `void name(float *a, float *b, float *out, long n)`.
    ///
    /// The signature cannot be verified; a symbol with any other signature
    /// makes every later call undefined behaviour.
    pub fn elementwise(&self, name: &str) -> Result<ElementwiseOp<'_>, RuntimeError> {
        let func = unsafe { self.lib.get::<ElementwiseFn>(name.as_bytes()) }
            .map_err(|source| self.missing(name, source))?;
        Ok(ElementwiseOp {
            name: name.to_string(),
            func,
        })
    }

    /// Calls the zero-argument entry point `name`.
    pub fn call_entry(&self, name: &str) -> Result<(), RuntimeError> {
        let entry = unsafe { self.lib.get::<EntryFn>(name.as_bytes()) }
            .map_err(|source| self.missing(name, source))?;
        tracing::debug!("calling {name}");
        unsafe { (*entry)() };
        Ok(())
    }

    fn missing(&self, symbol: &str, source: libloading::Error) -> RuntimeError {
        RuntimeError::MissingSymbol {
            path: self.path.clone(),
            symbol: symbol.to_string(),
            source,
        }
    }
}

/// An elementwise entry point: `out[i] = f(a[i], b[i])` for `i < n`.
pub struct ElementwiseOp<'lib> {
    name: String,
    func: Symbol<'lib, ElementwiseFn>,
}

impl ElementwiseOp<'_> {
    /// The exported symbol name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calls the entry point with `n = out.len()`.
    ///
    /// # Safety
    ///
    /// `a` and `b` must hold at least `out.len()` elements, `out.len()` must
    /// fit in a C `long`, and the symbol must have the elementwise signature.
    pub unsafe fn call_raw(&self, a: Buffer<'_>, b: Buffer<'_>, mut out: BufferMut<'_>) {
        let n = out.len() as c_long;
        (*self.func)(a.as_ptr(), b.as_ptr(), out.as_mut_ptr(), n);
    }

    /// Computes `out[i] = f(a[i], b[i])` over equally sized slices.
    pub fn apply(&self, a: &[f32], b: &[f32], out: &mut [f32]) -> Result<(), RuntimeError> {
        check_lengths(a.len(), b.len(), out.len())?;
        unsafe {
            self.call_raw(
                Buffer::from_slice(a),
                Buffer::from_slice(b),
                BufferMut::from_slice(out),
            );
        }
        Ok(())
    }
}

impl std::fmt::Debug for ElementwiseOp<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementwiseOp")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn check_lengths(a: usize, b: usize, out: usize) -> Result<(), RuntimeError> {
    if a != b || a != out {
        return Err(RuntimeError::Argument(format!(
            "buffer lengths differ: a={a}, b={b}, out={out}"
        )));
    }
    if c_long::try_from(out).is_err() {
        return Err(RuntimeError::Argument(format!(
            "buffer of {out} elements is too large"
        )));
    }
    Ok(())
}

/// Exercises a freshly built library: adds `0..10` to itself through
/// [`ELEMENTWISE_ENTRY`], then runs [`EXPRESSION_TREE_ENTRY`] if the library
/// exports it. Returns the sums.
pub fn run_demo(library: &NativeLibrary) -> Result<Vec<f32>, RuntimeError> {
    let input: Vec<f32> = (0..10).map(|i| i as f32).collect();
    let mut output = vec![0.0f32; input.len()];

    let add = library.elementwise(ELEMENTWISE_ENTRY)?;
    add.apply(&input, &input, &mut output)?;
    tracing::info!("{} {:?} + {:?} = {:?}", add.name(), input, input, output);

    if library.has_symbol(EXPRESSION_TREE_ENTRY) {
        library.call_entry(EXPRESSION_TREE_ENTRY)?;
    } else {
        tracing::debug!("{} not exported", EXPRESSION_TREE_ENTRY);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_path_is_argument_error() {
        let err = NativeLibrary::load(Path::new("/nonexistent/libkiln_native.so")).unwrap_err();
        assert!(err.is_argument());
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn load_empty_path_is_argument_error() {
        let err = NativeLibrary::load(Path::new("")).unwrap_err();
        assert!(err.is_argument());
    }

    #[test]
    fn load_directory_is_argument_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(NativeLibrary::load(dir.path()).unwrap_err().is_argument());
    }

    #[test]
    fn load_garbage_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libgarbage.so");
        std::fs::write(&path, b"this is not a shared object").unwrap();

        match NativeLibrary::load(&path).unwrap_err() {
            RuntimeError::Load { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected Load, got {other:?}"),
        }
    }

    #[test]
    fn lengths_must_match() {
        assert!(check_lengths(10, 10, 10).is_ok());
        assert!(check_lengths(0, 0, 0).is_ok());

        let err = check_lengths(10, 9, 10).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: buffer lengths differ: a=10, b=9, out=10"
        );
        assert!(check_lengths(10, 10, 11).unwrap_err().is_argument());
    }

    #[cfg(unix)]
    const NATIVE_SOURCE: &str = r#"
void test_add(float *a, float *b, float *c, long n) {
  while (n--) {
    *c++ = *a++ + *b++;
  }
}

int tree_calls = 0;

void native_expression_tree(void) {
  tree_calls++;
}
"#;

    /// Compiles `source` into a shared library under `dir`, or returns
    /// `None` when no C compiler is available.
    #[cfg(unix)]
    fn compile(dir: &Path, source: &str) -> Option<PathBuf> {
        let c_file = dir.join("native.c");
        std::fs::write(&c_file, source).unwrap();
        let lib = dir.join("libnative.so");
        let status = std::process::Command::new("cc")
            .args(["-shared", "-fPIC", "-o"])
            .arg(&lib)
            .arg(&c_file)
            .status();
        match status {
            Ok(status) if status.success() => Some(lib),
            _ => {
                eprintln!("skipping: no working `cc`");
                None
            }
        }
    }

    #[cfg(unix)]
    fn tree_calls(library: &NativeLibrary) -> i32 {
        unsafe { **library.lib.get::<*const i32>(b"tree_calls").unwrap() }
    }

    #[cfg(unix)]
    #[test]
    fn demo_adds_and_evaluates_tree() {
        let dir = tempfile::tempdir().unwrap();
        let Some(path) = compile(dir.path(), NATIVE_SOURCE) else {
            return;
        };
        let library = NativeLibrary::load(&path).unwrap();
        assert_eq!(library.path(), path);
        assert!(library.has_symbol(ELEMENTWISE_ENTRY));
        assert!(library.has_symbol(EXPRESSION_TREE_ENTRY));
        assert_eq!(tree_calls(&library), 0);

        let output = run_demo(&library).unwrap();

        let expected: Vec<f32> = (0..10).map(|i| (2 * i) as f32).collect();
        assert_eq!(output, expected);
        assert_eq!(tree_calls(&library), 1);
    }

    #[cfg(unix)]
    #[test]
    fn demo_without_expression_tree() {
        let dir = tempfile::tempdir().unwrap();
        let add_only = NATIVE_SOURCE.split("int tree_calls").next().unwrap();
        let Some(path) = compile(dir.path(), add_only) else {
            return;
        };
        let library = NativeLibrary::load(&path).unwrap();
        assert!(!library.has_symbol(EXPRESSION_TREE_ENTRY));
        assert_eq!(run_demo(&library).unwrap()[9], 18.0);
    }

    #[cfg(unix)]
    #[test]
    fn missing_entry_points() {
        let dir = tempfile::tempdir().unwrap();
        let Some(path) = compile(dir.path(), NATIVE_SOURCE) else {
            return;
        };
        let library = NativeLibrary::load(&path).unwrap();
        assert!(!library.has_symbol("nope"));

        match library.elementwise("nope").unwrap_err() {
            RuntimeError::MissingSymbol { path: p, symbol, .. } => {
                assert_eq!(p, path);
                assert_eq!(symbol, "nope");
            }
            other => panic!("expected MissingSymbol, got {other:?}"),
        }
        assert!(matches!(
            library.call_entry("nope"),
            Err(RuntimeError::MissingSymbol { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn apply_rejects_mismatched_lengths() {
        let dir = tempfile::tempdir().unwrap();
        let Some(path) = compile(dir.path(), NATIVE_SOURCE) else {
            return;
        };
        let library = NativeLibrary::load(&path).unwrap();
        let add = library.elementwise(ELEMENTWISE_ENTRY).unwrap();
        assert_eq!(add.name(), "test_add");

        let a = [1.0f32, 2.0, 3.0];
        let b = [10.0f32, 20.0];
        let mut out = [0.0f32; 3];
        let err = add.apply(&a, &b, &mut out).unwrap_err();
        assert!(err.is_argument());
        assert_eq!(out, [0.0; 3]);

        let b = [10.0f32, 20.0, 30.0];
        add.apply(&a, &b, &mut out).unwrap();
        assert_eq!(out, [11.0, 22.0, 33.0]);
    }

    #[cfg(unix)]
    #[test]
    fn call_raw_uses_output_length() {
        let dir = tempfile::tempdir().unwrap();
        let Some(path) = compile(dir.path(), NATIVE_SOURCE) else {
            return;
        };
        let library = NativeLibrary::load(&path).unwrap();
        let add = library.elementwise(ELEMENTWISE_ENTRY).unwrap();

        let a = [1.0f32, 2.0, 3.0, 4.0];
        let b = [1.0f32; 4];
        let mut out = [0.0f32; 2];
        unsafe {
            add.call_raw(
                Buffer::from_slice(&a),
                Buffer::from_slice(&b),
                BufferMut::from_slice(&mut out),
            );
        }
        assert_eq!(out, [2.0, 3.0]);
    }

    #[cfg(unix)]
    #[test]
    fn code_outlives_dropped_handle() {
        let dir = tempfile::tempdir().unwrap();
        let Some(path) = compile(dir.path(), NATIVE_SOURCE) else {
            return;
        };
        let library = NativeLibrary::load(&path).unwrap();
        let add: ElementwiseFn = *library.elementwise(ELEMENTWISE_ENTRY).unwrap().func;
        drop(library);

        let a = [1.5f32, 2.5];
        let mut out = [0.0f32; 2];
        unsafe { add(a.as_ptr(), a.as_ptr(), out.as_mut_ptr(), 2) };
        assert_eq!(out, [3.0, 5.0]);
    }
}
