//! C ABI bindings for `mcts-search`, exposed as an opaque handle — the
//! `Engine_*` functions any foreign-language binding layer calls.
//!
//! Plain `extern "C"` vtable over an opaque handle, so foreign bindings
//! never see the engine's internal arena or node types.
//!
//! Every exported function catches panics at the boundary and aborts the
//! process instead of unwinding across the FFI edge — unwinding into
//! foreign code is undefined behavior.

use std::panic::{self, AssertUnwindSafe};

use mcts_core::{Board, NUM_CELLS};
use mcts_search::{Engine, Evaluator};

/// Evaluator callback signature: populate `probs[i]`/`vs[i]` for every
/// `i < n`, reading the board bytes at `boards[i]`.
pub type EvalCallback =
    extern "C" fn(n: i32, boards: *const *const u8, probs: *mut *mut f64, vs: *mut *mut f64);

/// Build-time board configuration, returned by value.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub chessboard_size: i32,
    pub in_a_row: i32,
}

struct CCallbackEvaluator {
    callback: EvalCallback,
}

impl Evaluator for CCallbackEvaluator {
    fn evaluate(&mut self, boards: &[Board], out_p: &mut [[f64; NUM_CELLS]], out_v: &mut [f64]) {
        let n = boards.len();
        let board_bytes: Vec<[u8; 2 * NUM_CELLS]> = boards.iter().map(|b| b.to_bytes()).collect();
        let board_ptrs: Vec<*const u8> = board_bytes.iter().map(|b| b.as_ptr()).collect();
        let prob_ptrs: Vec<*mut f64> = out_p.iter_mut().map(|p| p.as_mut_ptr()).collect();
        let v_ptrs: Vec<*mut f64> = out_v.iter_mut().map(|v| v as *mut f64).collect();

        (self.callback)(n as i32, board_ptrs.as_ptr(), prob_ptrs.as_ptr() as *mut _, v_ptrs.as_ptr() as *mut _);
    }
}

/// Opaque handle to one search engine instance.
pub struct EngineHandle(Engine<CCallbackEvaluator>);

fn guard<F: FnOnce() -> R, R>(f: F) -> R {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(v) => v,
        Err(_) => std::process::abort(),
    }
}

/// `Create`: copy `2*N*N` bytes from `board_bytes` as the initial position.
///
/// # Safety
/// `board_bytes` must point to at least `2*N*N` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn mcts_create(
    board_bytes: *const u8,
    vloss: f64,
    batch_size: i32,
    evaluator_cb: EvalCallback,
) -> *mut EngineHandle {
    guard(|| {
        let bytes = std::slice::from_raw_parts(board_bytes, 2 * NUM_CELLS);
        let board = Board::from_bytes(bytes);
        let engine = Engine::new(board, vloss, batch_size.max(1) as usize, CCallbackEvaluator { callback: evaluator_cb });
        Box::into_raw(Box::new(EngineHandle(engine)))
    })
}

/// # Safety
/// `handle` must be a live pointer returned by [`mcts_create`].
#[no_mangle]
pub unsafe extern "C" fn mcts_search(handle: *mut EngineHandle, num_sims: i32, cpuct: f64, dirichlet_alpha: f64) {
    guard(|| {
        (*handle).0.search(num_sims.max(0) as usize, cpuct, dirichlet_alpha);
    })
}

/// # Safety
/// `handle` must be a live pointer returned by [`mcts_create`]; `(x, y)`
/// must name an already-expanded child (undefined otherwise).
#[no_mangle]
pub unsafe extern "C" fn mcts_step_forward(handle: *mut EngineHandle, x: i32, y: i32) {
    guard(|| {
        (*handle).0.step_forward(x as usize, y as usize);
    })
}

/// # Safety
/// `handle` must be live; `out` must point to `N*N` writable doubles.
#[no_mangle]
pub unsafe extern "C" fn mcts_get_pi(handle: *mut EngineHandle, temperature: f64, out: *mut f64) {
    guard(|| {
        let mut buf = [0.0; NUM_CELLS];
        (*handle).0.get_pi(temperature, &mut buf);
        std::ptr::copy_nonoverlapping(buf.as_ptr(), out, NUM_CELLS);
    })
}

/// # Safety
/// `handle` must be a live pointer returned by [`mcts_create`].
#[no_mangle]
pub unsafe extern "C" fn mcts_terminated(handle: *mut EngineHandle) -> bool {
    guard(|| (*handle).0.terminated())
}

/// # Safety
/// `handle` must be a live pointer returned by [`mcts_create`].
#[no_mangle]
pub unsafe extern "C" fn mcts_value(handle: *mut EngineHandle) -> f64 {
    guard(|| (*handle).0.value())
}

/// # Safety
/// `handle` must be live; `out` must point to `2*N*N` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn mcts_chessboard(handle: *mut EngineHandle, out: *mut u8) {
    guard(|| {
        let bytes = (*handle).0.chessboard();
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), out, 2 * NUM_CELLS);
    })
}

/// # Safety
/// `handle` must be a live pointer returned by [`mcts_create`], and must
/// not be used again afterward.
#[no_mangle]
pub unsafe extern "C" fn mcts_destroy(handle: *mut EngineHandle) {
    guard(|| {
        drop(Box::from_raw(handle));
    })
}

#[no_mangle]
pub extern "C" fn mcts_get_config() -> Config {
    let cfg = mcts_core::config();
    Config {
        chessboard_size: cfg.chessboard_size as i32,
        in_a_row: cfg.in_a_row as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    extern "C" fn mock_eval(n: i32, boards: *const *const u8, probs: *mut *mut f64, vs: *mut *mut f64) {
        unsafe {
            for i in 0..n as isize {
                let prob_ptr = *probs.offset(i);
                for j in 0..NUM_CELLS as isize {
                    *prob_ptr.offset(j) = 1.0 / NUM_CELLS as f64;
                }
                *(*vs.offset(i)) = 0.0;
                let _ = *boards.offset(i); // board pointer is readable
            }
        }
    }

    #[test]
    fn create_search_get_pi_destroy_roundtrip() {
        let board = Board::empty();
        let bytes = board.to_bytes();

        unsafe {
            let handle = mcts_create(bytes.as_ptr(), 1.0, 4, mock_eval);
            mcts_search(handle, 8, 3.0, 0.0);

            let mut out = [0.0f64; NUM_CELLS];
            mcts_get_pi(handle, 1.0, out.as_mut_ptr());
            let sum: f64 = out.iter().sum();
            assert!((sum - 1.0).abs() < 1e-6);

            assert!(!mcts_terminated(handle));
            mcts_destroy(handle);
        }
    }

    #[test]
    fn get_config_matches_core_constants() {
        let cfg = mcts_get_config();
        assert_eq!(cfg.chessboard_size, mcts_core::CHESSBOARD_SIZE as i32);
        assert_eq!(cfg.in_a_row, mcts_core::IN_A_ROW as i32);
    }
}
