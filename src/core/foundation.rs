// SPDX-License-Identifier: MIT

//! CoreFoundation bridge for the CFPreferences-backed gateway.
//!
//! Reads a whole preference domain for CurrentUser / AnyHost and writes keys back,
//! synchronizing once per write. Values cross the boundary as [`PrefValue`].

use std::collections::HashMap;

use core_foundation::{base::TCFType, string::CFString};
use core_foundation_sys::{
    array::{
        CFArrayCreate, CFArrayGetCount, CFArrayGetTypeID, CFArrayGetValueAtIndex,
        kCFTypeArrayCallBacks,
    },
    base::{CFGetTypeID, CFRelease, CFRetain, CFTypeRef, kCFAllocatorDefault},
    data::{CFDataCreate, CFDataGetBytePtr, CFDataGetLength, CFDataGetTypeID},
    date::{CFDateCreate, CFDateGetAbsoluteTime, CFDateGetTypeID},
    dictionary::{
        CFDictionaryCreate, CFDictionaryGetCount, CFDictionaryGetKeysAndValues,
        CFDictionaryGetTypeID, kCFTypeDictionaryKeyCallBacks, kCFTypeDictionaryValueCallBacks,
    },
    number::{
        CFBooleanGetTypeID, CFNumberCreate, CFNumberGetTypeID, CFNumberGetValue,
        CFNumberIsFloatType, CFNumberType, kCFBooleanFalse, kCFBooleanTrue, kCFNumberDoubleType,
        kCFNumberSInt64Type,
    },
    preferences::{
        CFPreferencesAppSynchronize, CFPreferencesCopyAppValue, CFPreferencesCopyKeyList,
        CFPreferencesSetAppValue, kCFPreferencesAnyHost, kCFPreferencesCurrentUser,
    },
    string::CFStringGetTypeID,
    url::{CFURLGetString, CFURLGetTypeID},
};

use crate::core::{
    error::DockError,
    types::{PrefValue, RawStore},
};

/// Read every key of `domain`.
pub(crate) fn read_domain(domain: &str) -> Result<RawStore, DockError> {
    unsafe {
        let domain_cf = CFString::new(domain);
        let keys_ref = CFPreferencesCopyKeyList(
            domain_cf.as_concrete_TypeRef(),
            kCFPreferencesCurrentUser,
            kCFPreferencesAnyHost,
        );
        if keys_ref.is_null() {
            return Err(DockError::StoreUnavailable(format!(
                "no preferences found for {domain}"
            )));
        }
        let len = CFArrayGetCount(keys_ref);
        let mut map = HashMap::with_capacity(len as usize);
        for i in 0..len {
            let key_ref = CFArrayGetValueAtIndex(keys_ref, i);
            if key_ref.is_null() || CFGetTypeID(key_ref as _) != CFStringGetTypeID() {
                continue;
            }
            let key_cf = CFString::wrap_under_get_rule(key_ref as _);
            let raw = CFPreferencesCopyAppValue(
                key_cf.as_concrete_TypeRef(),
                domain_cf.as_concrete_TypeRef(),
            );
            if !raw.is_null() {
                map.insert(key_cf.to_string(), cf_to_pref(raw));
                CFRelease(raw);
            }
        }
        CFRelease(keys_ref as CFTypeRef);
        Ok(map)
    }
}

/// Remove `keys` from `domain`. Takes effect on the next synchronize.
pub(crate) fn clear_keys(domain: &str, keys: &[&str]) {
    unsafe {
        let domain_cf = CFString::new(domain);
        for key in keys {
            let key_cf = CFString::new(key);
            CFPreferencesSetAppValue(
                key_cf.as_concrete_TypeRef(),
                std::ptr::null(),
                domain_cf.as_concrete_TypeRef(),
            );
        }
    }
}

/// Set every key of `store` in `domain`, then synchronize.
pub(crate) fn write_domain(domain: &str, store: &RawStore) -> Result<(), DockError> {
    unsafe {
        let domain_cf = CFString::new(domain);
        for (key, value) in store {
            let key_cf = CFString::new(key);
            let value_ref = pref_to_cf(value);
            CFPreferencesSetAppValue(
                key_cf.as_concrete_TypeRef(),
                value_ref,
                domain_cf.as_concrete_TypeRef(),
            );
            if !value_ref.is_null() {
                CFRelease(value_ref);
            }
        }
        if CFPreferencesAppSynchronize(domain_cf.as_concrete_TypeRef()) != 0 {
            Ok(())
        } else {
            Err(DockError::StoreWrite(format!(
                "CFPreferencesAppSynchronize failed for {domain}"
            )))
        }
    }
}

// Conversion helpers; only this module talks CF types.

unsafe fn cfnumber_to_pref(r: CFTypeRef) -> PrefValue {
    unsafe {
        if CFNumberIsFloatType(r as _) != 0 {
            let mut f: f64 = 0.0;
            CFNumberGetValue(
                r as _,
                kCFNumberDoubleType as CFNumberType,
                &mut f as *mut f64 as *mut _,
            );
            PrefValue::Float(f)
        } else {
            let mut i: i64 = 0;
            CFNumberGetValue(
                r as _,
                kCFNumberSInt64Type as CFNumberType,
                &mut i as *mut i64 as *mut _,
            );
            PrefValue::Integer(i)
        }
    }
}

unsafe fn cfdict_to_pref(r: CFTypeRef) -> PrefValue {
    let count = unsafe { CFDictionaryGetCount(r as _) } as usize;
    let mut keys: Vec<CFTypeRef> = vec![std::ptr::null(); count];
    let mut vals: Vec<CFTypeRef> = vec![std::ptr::null(); count];
    unsafe {
        CFDictionaryGetKeysAndValues(
            r as _,
            keys.as_mut_ptr() as *mut _,
            vals.as_mut_ptr() as *mut _,
        );
    }
    let mut map = HashMap::with_capacity(count);
    for (kref, vref) in keys.into_iter().zip(vals) {
        if kref.is_null() || vref.is_null() {
            continue;
        }
        if unsafe { CFGetTypeID(kref) } == unsafe { CFStringGetTypeID() } {
            let key = unsafe { CFString::wrap_under_get_rule(kref as _) }.to_string();
            map.insert(key, unsafe { cf_to_pref(vref) });
        }
    }
    PrefValue::Dictionary(map)
}

unsafe fn cf_to_pref(r: CFTypeRef) -> PrefValue {
    unsafe {
        let tid = CFGetTypeID(r);
        if tid == CFStringGetTypeID() {
            PrefValue::String(CFString::wrap_under_get_rule(r as _).to_string())
        } else if tid == CFBooleanGetTypeID() {
            PrefValue::Boolean(r == kCFBooleanTrue as CFTypeRef)
        } else if tid == CFNumberGetTypeID() {
            cfnumber_to_pref(r)
        } else if tid == CFArrayGetTypeID() {
            let len = CFArrayGetCount(r as _);
            let mut out = Vec::with_capacity(len as usize);
            for i in 0..len {
                let item = CFArrayGetValueAtIndex(r as _, i);
                if !item.is_null() {
                    out.push(cf_to_pref(item));
                }
            }
            PrefValue::Array(out)
        } else if tid == CFDictionaryGetTypeID() {
            cfdict_to_pref(r)
        } else if tid == CFDataGetTypeID() {
            let len = CFDataGetLength(r as _);
            let ptr = CFDataGetBytePtr(r as _);
            PrefValue::Data(std::slice::from_raw_parts(ptr, len as usize).to_vec())
        } else if tid == CFDateGetTypeID() {
            PrefValue::Date(CFDateGetAbsoluteTime(r as _))
        } else if tid == CFURLGetTypeID() {
            let s = CFURLGetString(r as _);
            PrefValue::String(CFString::wrap_under_get_rule(s).to_string())
        } else {
            PrefValue::String("<unsupported CF type>".into())
        }
    }
}

/// Returns a +1 retained CF object.
fn pref_to_cf(value: &PrefValue) -> CFTypeRef {
    match value {
        PrefValue::String(s) => {
            let cs = CFString::new(s);
            let ptr = cs.as_concrete_TypeRef() as CFTypeRef;
            unsafe { CFRetain(ptr) };
            ptr
        }
        PrefValue::Integer(i) => unsafe {
            CFNumberCreate(
                kCFAllocatorDefault,
                kCFNumberSInt64Type,
                i as *const i64 as *const _,
            ) as CFTypeRef
        },
        PrefValue::Float(f) => unsafe {
            CFNumberCreate(
                kCFAllocatorDefault,
                kCFNumberDoubleType,
                f as *const f64 as *const _,
            ) as CFTypeRef
        },
        PrefValue::Boolean(b) => unsafe {
            let r = (if *b { kCFBooleanTrue } else { kCFBooleanFalse }) as CFTypeRef;
            CFRetain(r);
            r
        },
        PrefValue::Array(items) => unsafe {
            let cf_items: Vec<CFTypeRef> = items.iter().map(pref_to_cf).collect();
            let arr = CFArrayCreate(
                kCFAllocatorDefault,
                cf_items.as_ptr() as *const _,
                cf_items.len() as isize,
                &kCFTypeArrayCallBacks,
            ) as CFTypeRef;
            for &it in &cf_items {
                CFRelease(it);
            }
            arr
        },
        PrefValue::Dictionary(map) => unsafe {
            let keys: Vec<CFTypeRef> = map
                .keys()
                .map(|k| pref_to_cf(&PrefValue::String(k.clone())))
                .collect();
            let values: Vec<CFTypeRef> = map.values().map(pref_to_cf).collect();
            let dict = CFDictionaryCreate(
                kCFAllocatorDefault,
                keys.as_ptr() as *const _,
                values.as_ptr() as *const _,
                keys.len() as isize,
                &kCFTypeDictionaryKeyCallBacks,
                &kCFTypeDictionaryValueCallBacks,
            ) as CFTypeRef;
            for &r in keys.iter().chain(values.iter()) {
                CFRelease(r);
            }
            dict
        },
        PrefValue::Data(data) => unsafe {
            CFDataCreate(kCFAllocatorDefault, data.as_ptr(), data.len() as isize) as CFTypeRef
        },
        PrefValue::Date(dt) => unsafe { CFDateCreate(kCFAllocatorDefault, *dt) as CFTypeRef },
        // UIDs only occur in keyed archives, never in CFPreferences values.
        PrefValue::Uid(uid) => pref_to_cf(&PrefValue::Integer(*uid as i64)),
    }
}
