/*
 * This file is part of pamfingerprint.
 *
 * Copyright (C) 2025 pamfingerprint contributors
 *
 * pamfingerprint is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * pamfingerprint is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with pamfingerprint. If not, see <https://www.gnu.org/licenses/>.
 */

//! Linux-PAM service module entry points
//!
//! The module is loaded by libpam, which already has its own symbols in the
//! process. They are looked up with `dlsym` at call time, so the library
//! does not link against libpam and unit tests run without it.

use std::ffi::{CStr, CString};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use libc::{c_char, c_int, c_void};
use pf_error::{FingerprintError, Result};
use tracing::{debug, error};

use crate::audit;
use crate::auth::{set_credentials, Authenticator};
use crate::config::ModuleArgs;
use crate::logging;
use crate::session::Session;

pub const PAM_SUCCESS: c_int = 0;
pub const PAM_SYMBOL_ERR: c_int = 2;
pub const PAM_AUTH_ERR: c_int = 7;
pub const PAM_USER_UNKNOWN: c_int = 10;
pub const PAM_CONV_ERR: c_int = 19;
pub const PAM_IGNORE: c_int = 25;

pub const PAM_SILENT: c_int = 0x8000;

const PAM_SERVICE: c_int = 1;
const PAM_CONV: c_int = 5;
const PAM_RUSER: c_int = 8;

const PAM_TEXT_INFO: c_int = 4;

/// Opaque `pam_handle_t`
#[repr(C)]
pub struct PamHandle {
    _private: [u8; 0],
}

#[repr(C)]
#[allow(dead_code)]
struct PamMessage {
    msg_style: c_int,
    msg: *const c_char,
}

#[repr(C)]
#[allow(dead_code)]
struct PamResponse {
    resp: *mut c_char,
    resp_retcode: c_int,
}

type ConvFn = unsafe extern "C" fn(c_int, *mut *const PamMessage, *mut *mut PamResponse, *mut c_void) -> c_int;

#[repr(C)]
struct PamConv {
    conv: Option<ConvFn>,
    appdata_ptr: *mut c_void,
}

type GetItemFn = unsafe extern "C" fn(*const PamHandle, c_int, *mut *const c_void) -> c_int;
type GetUserFn = unsafe extern "C" fn(*mut PamHandle, *mut *const c_char, *const c_char) -> c_int;

/// libpam functions the module calls back into
struct LibPam {
    get_item: GetItemFn,
    get_user: GetUserFn,
}

fn symbol(name: &'static [u8]) -> Result<*mut c_void> {
    // SAFETY: name is a NUL-terminated literal
    let ptr = unsafe { libc::dlsym(libc::RTLD_DEFAULT, name.as_ptr() as *const c_char) };
    if ptr.is_null() {
        let name = String::from_utf8_lossy(&name[..name.len() - 1]).into_owned();
        return Err(FingerprintError::Pam {
            call: format!("dlsym({})", name),
            code: PAM_SYMBOL_ERR,
        });
    }
    Ok(ptr)
}

impl LibPam {
    fn resolve() -> Result<Self> {
        let get_item = symbol(b"pam_get_item\0")?;
        let get_user = symbol(b"pam_get_user\0")?;
        // SAFETY: both symbols have these C signatures in every Linux-PAM release
        unsafe {
            Ok(Self {
                get_item: std::mem::transmute::<*mut c_void, GetItemFn>(get_item),
                get_user: std::mem::transmute::<*mut c_void, GetUserFn>(get_user),
            })
        }
    }
}

/// Session backed by a live PAM handle
pub struct PamSession {
    handle: *mut PamHandle,
    lib: LibPam,
}

impl PamSession {
    /// # Safety
    ///
    /// `handle` must be the handle libpam passed to the current entry point.
    pub unsafe fn new(handle: *mut PamHandle) -> Result<Self> {
        if handle.is_null() {
            return Err(FingerprintError::Pam {
                call: "pam handle".to_string(),
                code: PAM_USER_UNKNOWN,
            });
        }
        Ok(Self {
            handle,
            lib: LibPam::resolve()?,
        })
    }

    fn item(&self, item: c_int) -> Result<*const c_void> {
        let mut value: *const c_void = ptr::null();
        // SAFETY: the handle is valid for the duration of the entry point
        let rc = unsafe { (self.lib.get_item)(self.handle, item, &mut value) };
        if rc != PAM_SUCCESS {
            return Err(FingerprintError::Pam {
                call: format!("pam_get_item({})", item),
                code: rc,
            });
        }
        Ok(value)
    }

    fn string_item(&self, item: c_int) -> Result<Option<String>> {
        let value = self.item(item)?;
        Ok(owned_string(value as *const c_char))
    }
}

fn owned_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: libpam stores string items NUL-terminated
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

impl Session for PamSession {
    fn requesting_user(&mut self) -> Result<Option<String>> {
        self.string_item(PAM_RUSER)
    }

    fn target_user(&mut self) -> Result<Option<String>> {
        let mut user: *const c_char = ptr::null();
        // SAFETY: the handle is valid; a null prompt selects libpam's default
        let rc = unsafe { (self.lib.get_user)(self.handle, &mut user, ptr::null()) };
        if rc != PAM_SUCCESS {
            return Err(FingerprintError::Pam {
                call: "pam_get_user".to_string(),
                code: rc,
            });
        }
        Ok(owned_string(user))
    }

    fn service(&mut self) -> Option<String> {
        self.string_item(PAM_SERVICE).ok().flatten()
    }

    fn notify(&mut self, message: &str) -> Result<()> {
        let conv_err = |code| FingerprintError::Pam {
            call: "conversation".to_string(),
            code,
        };

        let conv = self.item(PAM_CONV)? as *const PamConv;
        if conv.is_null() {
            return Err(conv_err(PAM_CONV_ERR));
        }
        // SAFETY: PAM_CONV points at the application's pam_conv
        let (func, appdata) = unsafe { ((*conv).conv, (*conv).appdata_ptr) };
        let func = func.ok_or_else(|| conv_err(PAM_CONV_ERR))?;

        let text = CString::new(message.replace('\0', " ")).map_err(|_| conv_err(PAM_CONV_ERR))?;
        let msg = PamMessage {
            msg_style: PAM_TEXT_INFO,
            msg: text.as_ptr(),
        };
        let mut msg_ptr: *const PamMessage = &msg;
        let mut response: *mut PamResponse = ptr::null_mut();

        // SAFETY: one valid message; the application allocates any response with malloc
        let rc = unsafe { func(1, &mut msg_ptr, &mut response, appdata) };
        if !response.is_null() {
            unsafe {
                if !(*response).resp.is_null() {
                    libc::free((*response).resp as *mut c_void);
                }
                libc::free(response as *mut c_void);
            }
        }

        if rc != PAM_SUCCESS {
            return Err(conv_err(rc));
        }
        Ok(())
    }
}

/// Copy `argv` into owned strings, skipping null entries
///
/// # Safety
///
/// `argv` must be null or point at `argc` C strings.
unsafe fn module_args(argc: c_int, argv: *const *const c_char) -> Vec<String> {
    if argv.is_null() || argc <= 0 {
        return Vec::new();
    }
    std::slice::from_raw_parts(argv, argc as usize)
        .iter()
        .filter_map(|&arg| owned_string(arg))
        .collect()
}

/// Authenticator for the module arguments; `PAM_SILENT` also suppresses notices
fn authenticator_for(args: &ModuleArgs, flags: c_int) -> Authenticator {
    let silent = flags & PAM_SILENT != 0;
    Authenticator::new(&args.config_path)
        .timeout_secs(args.timeout_secs)
        .quiet(args.quiet || silent)
}

unsafe fn authenticate(handle: *mut PamHandle, flags: c_int, argc: c_int, argv: *const *const c_char) -> c_int {
    let raw_args = module_args(argc, argv);
    logging::init_module(raw_args.iter().any(|a| a == "debug"));
    let (args, _unknown) = ModuleArgs::parse(&raw_args);

    let mut session = match PamSession::new(handle) {
        Ok(session) => session,
        Err(e) => {
            error!("Could not use the PAM handle: {}", e);
            return PAM_USER_UNKNOWN;
        }
    };

    let authenticator = authenticator_for(&args, flags);
    debug!(config = %authenticator.config_path().display(), flags, "Authenticating");

    let report = authenticator.authenticate(&mut session);
    if let Some(path) = &args.audit_path {
        audit::record(path, &report);
    }
    report.outcome.code()
}

/// `pam_sm_authenticate(3)`
#[no_mangle]
pub extern "C" fn pam_sm_authenticate(
    pamh: *mut PamHandle,
    flags: c_int,
    argc: c_int,
    argv: *const *const c_char,
) -> c_int {
    // SAFETY: libpam passes its handle and the module arguments
    let result = panic::catch_unwind(AssertUnwindSafe(|| unsafe { authenticate(pamh, flags, argc, argv) }));
    result.unwrap_or(PAM_AUTH_ERR)
}

/// `pam_sm_setcred(3)`
#[no_mangle]
pub extern "C" fn pam_sm_setcred(
    _pamh: *mut PamHandle,
    _flags: c_int,
    _argc: c_int,
    _argv: *const *const c_char,
) -> c_int {
    set_credentials().code()
}
