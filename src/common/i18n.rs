// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::LazyLock;

/// Language used when the caller's language has no catalogue.
pub const FALLBACK_LANGUAGE: &str = "en";

// (key, english, indonesian)
const CATALOGUE: &[(&str, &str, &str)] = &[
    // --- auth ---
    ("auth.login_success", "Login successful", "Login berhasil"),
    ("auth.register_success", "Registration successful. Please log in", "Registrasi berhasil. Silakan login"),
    ("auth.invalid_credentials", "Invalid username or password", "Username atau password salah"),
    ("auth.username_required", "Username and password are required", "Username dan password harus diisi"),
    ("auth.password_required", "Username and password are required", "Username dan password harus diisi"),
    ("auth.duplicate_username", "Username is already taken", "Username sudah digunakan"),
    ("auth.duplicate_code", "NISN is already registered", "NISN sudah terdaftar"),
    ("auth.invalid_class", "Invalid class. Choose: X, XI, or XII", "Kelas tidak valid. Pilih: X, XI, atau XII"),
    (
        "auth.invalid_major",
        "Invalid major. Choose: RPL, DKV1, DKV2, BR, MP, or AK",
        "Jurusan tidak valid. Pilih: RPL, DKV1, DKV2, BR, MP, atau AK",
    ),
    ("account.not_found", "User not found", "Pengguna tidak ditemukan"),
    ("employee.status_updated", "Employee status updated", "Status employee berhasil diperbarui"),
    // --- token / access ---
    ("token.missing", "Token not found", "Token tidak ditemukan"),
    ("token.expired", "Session has expired, please log in again", "Sesi telah berakhir, silakan login kembali"),
    ("token.invalid", "Invalid token", "Token tidak valid"),
    ("access.denied", "Access denied. Only {role} is allowed", "Akses ditolak. Hanya {role} yang diizinkan"),
    // --- validation ---
    ("error.validation", "One or more fields are invalid.", "Satu atau lebih field tidak valid."),
    ("error.malformed_body", "Malformed request body", "Format request tidak valid"),
    ("error.invalid_parameter", "Invalid path or query parameter", "Parameter path atau query tidak valid"),
    ("field.required", "This field is required", "Field ini harus diisi"),
    ("field.not_negative", "Value cannot be negative", "Nilai tidak boleh negatif"),
    // --- products ---
    ("product.name_required", "Product name is required", "Nama produk harus diisi"),
    ("product.supplier_required", "Supplier is required", "Supplier harus diisi"),
    ("product.price_too_large", "Price is too large", "Harga terlalu besar"),
    ("product.price_scale", "Price can have at most 2 decimal places", "Harga maksimal 2 angka desimal"),
    ("product.not_found", "Product not found", "Produk tidak ditemukan"),
    ("product.created", "Product added", "Produk berhasil ditambahkan"),
    ("product.updated", "Product updated", "Produk berhasil diupdate"),
    ("product.deleted", "Product deleted", "Produk berhasil dihapus"),
    // --- categories ---
    ("category.name_required", "Category name is required", "Nama kategori harus diisi"),
    ("category.name_taken", "Category name is already in use", "Nama kategori sudah digunakan"),
    ("category.not_found", "Category not found", "Kategori tidak ditemukan"),
    ("category.created", "Category added", "Kategori berhasil ditambahkan"),
    ("category.updated", "Category updated", "Kategori berhasil diperbarui"),
    ("category.deleted", "Category deleted", "Kategori berhasil dihapus"),
    (
        "category.in_use",
        "Cannot delete a category that has {count} products. Delete or move the products first.",
        "Tidak dapat menghapus kategori yang memiliki {count} produk. Hapus atau pindahkan produk terlebih dahulu.",
    ),
    // --- uploads ---
    ("upload.success", "File uploaded", "File berhasil diupload"),
    ("upload.missing", "No file was uploaded", "Tidak ada file yang diupload"),
    ("upload.not_image", "File must be an image", "File harus berupa gambar"),
    ("upload.too_large", "File exceeds the {limit} byte limit", "Ukuran file melebihi batas {limit} byte"),
    // --- infrastructure ---
    ("error.storage_unavailable", "Storage is temporarily unavailable", "Penyimpanan sedang tidak tersedia"),
    ("error.unexpected", "An unexpected error occurred", "Terjadi kesalahan server"),
];

static BUILTIN: LazyLock<I18nStore> = LazyLock::new(I18nStore::new);

/// Message catalogue keyed by language and message key.
#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

impl I18nStore {
    pub fn new() -> Self {
        let mut en = HashMap::with_capacity(CATALOGUE.len());
        let mut id = HashMap::with_capacity(CATALOGUE.len());
        for (key, english, indonesian) in CATALOGUE {
            en.insert(*key, *english);
            id.insert(*key, *indonesian);
        }

        let mut messages = HashMap::new();
        messages.insert("en", en);
        messages.insert("id", id);
        Self { messages }
    }

    /// Catalogue shared by code paths that have no `AppState` at hand.
    pub fn builtin() -> &'static I18nStore {
        &BUILTIN
    }

    /// Resolves `key` for `lang`; unknown languages use the fallback and
    /// unknown keys come back unchanged.
    pub fn message(&self, lang: &str, key: &str) -> String {
        self.lookup(lang, key).unwrap_or(key).to_string()
    }

    /// Like [`message`](Self::message) with `{name}` placeholders substituted.
    pub fn format(&self, lang: &str, key: &str, args: &[(&str, String)]) -> String {
        let mut text = self.message(lang, key);
        for (name, value) in args {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&'static str> {
        self.messages
            .get(lang)
            .and_then(|m| m.get(key))
            .or_else(|| self.messages.get(FALLBACK_LANGUAGE).and_then(|m| m.get(key)))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_per_language_with_fallback() {
        let store = I18nStore::new();
        assert_eq!(store.message("id", "product.not_found"), "Produk tidak ditemukan");
        assert_eq!(store.message("en", "product.not_found"), "Product not found");
        assert_eq!(store.message("fr", "product.not_found"), "Product not found");
        assert_eq!(store.message("en", "no.such.key"), "no.such.key");
    }

    #[test]
    fn substitutes_placeholders() {
        let store = I18nStore::new();
        let msg = store.format("id", "category.in_use", &[("count", "3".to_string())]);
        assert!(msg.contains("memiliki 3 produk"));
    }

    #[test]
    fn every_key_is_translated() {
        for (key, english, indonesian) in CATALOGUE {
            assert!(!english.is_empty() && !indonesian.is_empty(), "{key}");
        }
    }
}
