//! Minimal DER reading for RSA public keys
//!
//! Only what is needed to learn the modulus size of a key before handing it
//! to the crypto backend: PKCS#1 `RSAPublicKey` and X.509
//! `SubjectPublicKeyInfo` wrapping one.

const TAG_INTEGER: u8 = 0x02;
const TAG_BIT_STRING: u8 = 0x03;
const TAG_SEQUENCE: u8 = 0x30;

struct Reader<'a> {
    input: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input }
    }

    /// Read one tag-length-value element
    fn read(&mut self) -> Option<(u8, &'a [u8])> {
        let (&tag, rest) = self.input.split_first()?;
        let (&first, rest) = rest.split_first()?;

        let (len, rest) = if first < 0x80 {
            (first as usize, rest)
        } else {
            let count = (first & 0x7f) as usize;
            if count == 0 || count > 4 || rest.len() < count {
                return None;
            }
            let (len_bytes, rest) = rest.split_at(count);
            let len = len_bytes
                .iter()
                .fold(0usize, |acc, b| (acc << 8) | *b as usize);
            (len, rest)
        };

        if rest.len() < len {
            return None;
        }
        let (value, rest) = rest.split_at(len);
        self.input = rest;
        Some((tag, value))
    }

    fn expect(&mut self, tag: u8) -> Option<&'a [u8]> {
        match self.read()? {
            (found, value) if found == tag => Some(value),
            _ => None,
        }
    }
}

/// Modulus size in bits of a PKCS#1 or SPKI encoded RSA public key
///
/// Returns `None` if the bytes are not a recognizable RSA public key.
pub(crate) fn rsa_modulus_bits(der: &[u8]) -> Option<usize> {
    let outer = Reader::new(der).expect(TAG_SEQUENCE)?;
    let mut fields = Reader::new(outer);

    match fields.read()? {
        // RSAPublicKey ::= SEQUENCE { modulus INTEGER, publicExponent INTEGER }
        (TAG_INTEGER, modulus) => Some(integer_bits(modulus)),

        // SubjectPublicKeyInfo ::= SEQUENCE { algorithm, subjectPublicKey BIT STRING }
        (TAG_SEQUENCE, _algorithm) => {
            let bits = fields.expect(TAG_BIT_STRING)?;
            let (&unused, key) = bits.split_first()?;
            if unused != 0 {
                return None;
            }
            let inner = Reader::new(key).expect(TAG_SEQUENCE)?;
            let modulus = Reader::new(inner).expect(TAG_INTEGER)?;
            Some(integer_bits(modulus))
        }

        _ => None,
    }
}

fn integer_bits(bytes: &[u8]) -> usize {
    let significant = match bytes.iter().position(|b| *b != 0) {
        Some(start) => &bytes[start..],
        None => return 0,
    };
    (significant.len() - 1) * 8 + (8 - significant[0].leading_zeros() as usize)
}
