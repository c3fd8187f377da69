//! Builders for minimal synthetic executables.

/// CPU type values used in fat architecture tables.
pub const CPU_TYPE_X86_64: u32 = 0x0100_0007;
pub const CPU_TYPE_ARM64: u32 = 0x0100_000c;

fn put_u16(data: &mut [u8], off: usize, v: u16) {
    data[off..off + 2].copy_from_slice(&v.to_le_bytes());
}

fn put_u32(data: &mut [u8], off: usize, v: u32) {
    data[off..off + 4].copy_from_slice(&v.to_le_bytes());
}

fn put_u64(data: &mut [u8], off: usize, v: u64) {
    data[off..off + 8].copy_from_slice(&v.to_le_bytes());
}

/// PE32 (or PE32+) image with a single section mapping RVA 0x1000 to file
/// offset 0x200.
///
/// The import descriptor, thunks and names all live inside that section;
/// the payload lands at its tail (file offset 0x3a0).
pub struct PeBuilder {
    pe32plus: bool,
    section_name: String,
    dll: Option<String>,
    functions: Vec<String>,
    dotnet: bool,
    payload: Vec<u8>,
}

impl Default for PeBuilder {
    fn default() -> Self {
        Self {
            pe32plus: false,
            section_name: ".text".to_string(),
            dll: None,
            functions: Vec::new(),
            dotnet: false,
            payload: Vec::new(),
        }
    }
}

impl PeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 64-bit optional header: magic 0x20b, 0xf0 bytes, directories at +112
    /// and 8-byte import thunks.
    pub fn pe32plus(mut self) -> Self {
        self.pe32plus = true;
        self
    }

    pub fn section(mut self, name: &str) -> Self {
        assert!(name.len() <= 8);
        self.section_name = name.to_string();
        self
    }

    pub fn import(mut self, dll: &str, functions: &[&str]) -> Self {
        assert!(dll.len() < 32 && functions.len() <= 7);
        self.dll = Some(dll.to_string());
        self.functions = functions.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn dotnet(mut self) -> Self {
        self.dotnet = true;
        self
    }

    pub fn payload(mut self, bytes: &[u8]) -> Self {
        assert!(bytes.len() <= 0x60);
        self.payload = bytes.to_vec();
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut data = vec![0u8; 0x400];

        data[0..2].copy_from_slice(b"MZ");
        put_u32(&mut data, 60, 0x80);
        data[0x80..0x84].copy_from_slice(b"PE\0\0");

        // COFF header
        let (magic, optional_size, rva_count_at, directories_at, thunk_size) = if self.pe32plus {
            (0x20b, 0xf0, 108, 112, 8)
        } else {
            (0x10b, 0xe0, 92, 96, 4)
        };
        put_u16(&mut data, 0x84, if self.pe32plus { 0x8664 } else { 0x14c });
        put_u16(&mut data, 0x86, 1);
        put_u16(&mut data, 0x94, optional_size as u16);

        // Optional header at 0x98 with 16 data directories
        let optional = 0x98;
        let directories = optional + directories_at;
        put_u16(&mut data, optional, magic);
        put_u32(&mut data, optional + rva_count_at, 16);
        if self.dll.is_some() {
            put_u32(&mut data, directories + 8, 0x1000);
            put_u32(&mut data, directories + 12, 40);
        }
        if self.dotnet {
            put_u32(&mut data, directories + 14 * 8, 0x2008);
            put_u32(&mut data, directories + 14 * 8 + 4, 0x48);
        }

        // Section header
        let header = optional + optional_size;
        let name = self.section_name.as_bytes();
        data[header..header + name.len()].copy_from_slice(name);
        put_u32(&mut data, header + 8, 0x200);
        put_u32(&mut data, header + 12, 0x1000);
        put_u32(&mut data, header + 16, 0x200);
        put_u32(&mut data, header + 20, 0x200);

        if let Some(dll) = &self.dll {
            put_u32(&mut data, 0x200, 0x1040);
            put_u32(&mut data, 0x200 + 12, 0x1080);
            put_u32(&mut data, 0x200 + 16, 0x1040);
            data[0x280..0x280 + dll.len()].copy_from_slice(dll.as_bytes());

            for (i, function) in self.functions.iter().enumerate() {
                let hint_name = 0x10a0 + (i as u32) * 0x20;
                if self.pe32plus {
                    put_u64(&mut data, 0x240 + i * thunk_size, hint_name as u64);
                } else {
                    put_u32(&mut data, 0x240 + i * thunk_size, hint_name);
                }
                let at = 0x2a0 + i * 0x20;
                data[at + 2..at + 2 + function.len()].copy_from_slice(function.as_bytes());
            }
        }

        data[0x3a0..0x3a0 + self.payload.len()].copy_from_slice(&self.payload);
        data
    }
}

const SHT_PROGBITS: u32 = 1;
const SHT_SYMTAB: u32 = 2;
const SHT_STRTAB: u32 = 3;
const SHT_DYNAMIC: u32 = 6;
const DT_NEEDED: u64 = 1;

struct RawSection {
    name: String,
    sh_type: u32,
    data: Vec<u8>,
    link: u32,
    entsize: u64,
}

/// 64-bit little-endian ELF with arbitrary PROGBITS sections, an optional
/// static symbol table and optional DT_NEEDED entries.
#[derive(Default)]
pub struct ElfBuilder {
    sections: Vec<(String, Vec<u8>)>,
    symbols: Vec<String>,
    needed: Vec<String>,
}

fn string_table(strings: &[String]) -> (Vec<u8>, Vec<u32>) {
    let mut table = vec![0u8];
    let mut offsets = Vec::new();
    for s in strings {
        offsets.push(table.len() as u32);
        table.extend_from_slice(s.as_bytes());
        table.push(0);
    }
    (table, offsets)
}

impl ElfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(mut self, name: &str, data: &[u8]) -> Self {
        self.sections.push((name.to_string(), data.to_vec()));
        self
    }

    pub fn symbol(mut self, name: &str) -> Self {
        self.symbols.push(name.to_string());
        self
    }

    pub fn needed(mut self, library: &str) -> Self {
        self.needed.push(library.to_string());
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut raw: Vec<RawSection> = self
            .sections
            .iter()
            .map(|(name, data)| RawSection {
                name: name.clone(),
                sh_type: SHT_PROGBITS,
                data: data.clone(),
                link: 0,
                entsize: 0,
            })
            .collect();

        if !self.symbols.is_empty() {
            let (strtab, offsets) = string_table(&self.symbols);
            let mut symtab = vec![0u8; 24];
            for name in offsets {
                let mut sym = [0u8; 24];
                sym[0..4].copy_from_slice(&name.to_le_bytes());
                sym[4] = 0x12; // STB_GLOBAL | STT_FUNC
                sym[6..8].copy_from_slice(&1u16.to_le_bytes());
                symtab.extend_from_slice(&sym);
            }
            // Header index of the string table: null + existing + symtab
            let strtab_index = raw.len() as u32 + 2;
            raw.push(RawSection {
                name: ".symtab".to_string(),
                sh_type: SHT_SYMTAB,
                data: symtab,
                link: strtab_index,
                entsize: 24,
            });
            raw.push(RawSection {
                name: ".strtab".to_string(),
                sh_type: SHT_STRTAB,
                data: strtab,
                link: 0,
                entsize: 0,
            });
        }

        if !self.needed.is_empty() {
            let (dynstr, offsets) = string_table(&self.needed);
            let mut dynamic = Vec::new();
            for name in offsets {
                dynamic.extend_from_slice(&DT_NEEDED.to_le_bytes());
                dynamic.extend_from_slice(&(name as u64).to_le_bytes());
            }
            dynamic.extend_from_slice(&[0u8; 16]);
            let dynstr_index = raw.len() as u32 + 2;
            raw.push(RawSection {
                name: ".dynamic".to_string(),
                sh_type: SHT_DYNAMIC,
                data: dynamic,
                link: dynstr_index,
                entsize: 16,
            });
            raw.push(RawSection {
                name: ".dynstr".to_string(),
                sh_type: SHT_STRTAB,
                data: dynstr,
                link: 0,
                entsize: 0,
            });
        }

        let mut names: Vec<String> = raw.iter().map(|s| s.name.clone()).collect();
        names.push(".shstrtab".to_string());
        let (shstrtab, name_offsets) = string_table(&names);
        raw.push(RawSection {
            name: ".shstrtab".to_string(),
            sh_type: SHT_STRTAB,
            data: shstrtab,
            link: 0,
            entsize: 0,
        });

        let mut data = vec![0u8; 64];
        let mut file_offsets = Vec::new();
        for section in &raw {
            data.resize((data.len() + 7) & !7, 0);
            file_offsets.push(data.len() as u64);
            data.extend_from_slice(&section.data);
        }
        data.resize((data.len() + 7) & !7, 0);
        let shoff = data.len();
        let shnum = raw.len() + 1;
        data.resize(shoff + shnum * 64, 0);

        for (i, section) in raw.iter().enumerate() {
            let base = shoff + (i + 1) * 64;
            put_u32(&mut data, base, name_offsets[i]);
            put_u32(&mut data, base + 4, section.sh_type);
            put_u64(&mut data, base + 24, file_offsets[i]);
            put_u64(&mut data, base + 32, section.data.len() as u64);
            put_u32(&mut data, base + 40, section.link);
            put_u64(&mut data, base + 48, 8);
            put_u64(&mut data, base + 56, section.entsize);
        }

        data[0..4].copy_from_slice(b"\x7fELF");
        data[4] = 2;
        data[5] = 1;
        data[6] = 1;
        put_u16(&mut data, 16, 2);
        put_u16(&mut data, 18, 62);
        put_u32(&mut data, 20, 1);
        put_u64(&mut data, 40, shoff as u64);
        put_u16(&mut data, 52, 64);
        put_u16(&mut data, 58, 64);
        put_u16(&mut data, 60, shnum as u16);
        put_u16(&mut data, 62, (shnum - 1) as u16);
        data
    }
}

/// Big-endian 64-bit thin Mach-O with one segment holding `sections`
/// (no file contents) followed by one LC_LOAD_DYLIB per entry of `dylibs`.
pub fn macho_thin(cputype: u32, sections: &[&str], dylibs: &[&str]) -> Vec<u8> {
    let mut cmds = Vec::new();
    cmds.extend_from_slice(&0x19u32.to_be_bytes());
    cmds.extend_from_slice(&((72 + 80 * sections.len()) as u32).to_be_bytes());
    let mut segname = [0u8; 16];
    segname[..6].copy_from_slice(b"__DATA");
    cmds.extend_from_slice(&segname);
    cmds.extend_from_slice(&[0u8; 40]);
    cmds.extend_from_slice(&(sections.len() as u32).to_be_bytes());
    cmds.extend_from_slice(&0u32.to_be_bytes());
    for name in sections {
        let mut raw = [0u8; 80];
        raw[..name.len()].copy_from_slice(name.as_bytes());
        raw[16..22].copy_from_slice(b"__DATA");
        cmds.extend_from_slice(&raw);
    }
    for path in dylibs {
        let mut name = path.as_bytes().to_vec();
        name.push(0);
        while (24 + name.len()) % 8 != 0 {
            name.push(0);
        }
        cmds.extend_from_slice(&0xcu32.to_be_bytes());
        cmds.extend_from_slice(&((24 + name.len()) as u32).to_be_bytes());
        cmds.extend_from_slice(&24u32.to_be_bytes());
        cmds.extend_from_slice(&[0u8; 12]);
        cmds.extend_from_slice(&name);
    }

    let mut data = Vec::new();
    data.extend_from_slice(&0xfeedfacfu32.to_be_bytes());
    data.extend_from_slice(&cputype.to_be_bytes());
    data.extend_from_slice(&3u32.to_be_bytes());
    data.extend_from_slice(&2u32.to_be_bytes());
    data.extend_from_slice(&(1 + dylibs.len() as u32).to_be_bytes());
    data.extend_from_slice(&(cmds.len() as u32).to_be_bytes());
    data.extend_from_slice(&[0u8; 8]);
    data.extend(cmds);
    data
}

/// Universal binary wrapping each `(cputype, image)` slice, 16-byte aligned.
pub fn macho_fat(slices: &[(u32, Vec<u8>)]) -> Vec<u8> {
    let mut offset = (8 + 20 * slices.len() + 15) & !15;
    let mut table = Vec::new();
    let mut body = Vec::new();
    for (cputype, image) in slices {
        table.extend_from_slice(&cputype.to_be_bytes());
        table.extend_from_slice(&0u32.to_be_bytes());
        table.extend_from_slice(&(offset as u32).to_be_bytes());
        table.extend_from_slice(&(image.len() as u32).to_be_bytes());
        table.extend_from_slice(&4u32.to_be_bytes());

        let mut padded = image.clone();
        padded.resize((image.len() + 15) & !15, 0);
        offset += padded.len();
        body.extend(padded);
    }

    let mut data = Vec::new();
    data.extend_from_slice(&0xcafebabeu32.to_be_bytes());
    data.extend_from_slice(&(slices.len() as u32).to_be_bytes());
    data.extend(table);
    data.resize((8 + 20 * slices.len() + 15) & !15, 0);
    data.extend(body);
    data
}

/// Minimal Java class file header (version 52) followed by a constant pool
/// stub.
pub fn java_class() -> Vec<u8> {
    let mut data = vec![0xca, 0xfe, 0xba, 0xbe, 0x00, 0x00, 0x00, 0x34];
    data.extend_from_slice(&[0x00, 0x0d, 0x0a, 0x00, 0x03]);
    data.resize(64, 0);
    data
}
